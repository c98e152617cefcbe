use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("cqlwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: cqlwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "protocol_version: {}",
        cqlwire_frame::PROTOCOL_VERSION
    );
    println!(
        "target: {}",
        option_env!("CQLWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "features: client={}, async={}, cli=true",
        cfg!(feature = "client"),
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}
