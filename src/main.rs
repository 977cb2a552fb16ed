use std::process::ExitCode;
use std::time::Duration;

use pinghr::icmp::v4::ECHO_OVERHEAD;
use pinghr::{GenericError, Pinger, ProbeConfig};

#[derive(argh::FromArgs)]
/// pinghr - send one ICMP ECHO_REQUEST and report the round-trip time
struct Args {
    #[argh(option, short = 's')]
    /// total packet size in bytes, ICMP header and timestamp included
    size: Option<usize>,

    #[argh(switch, short = 'f')]
    /// forbid fragmentation (not implemented)
    no_fragment: bool,

    #[argh(option, short = 't', default = "3000")]
    /// time to wait for a reply, in milliseconds
    timeout: u64,

    #[argh(switch, short = 'v')]
    /// print trace output on stderr
    verbose: bool,

    #[argh(positional)]
    /// host name or IPv4 address
    destination: Option<String>,
}

fn main() -> Result<ExitCode, GenericError> {
    let args: Args = argh::from_env();

    let level = if args.verbose {
        tracing::Level::TRACE
    } else {
        tracing::Level::ERROR
    };
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!("Ping device:");

    let Some(destination) = args.destination else {
        println!("Usage: pinghr [-s <size>] [-f] [-t <timeout>] destination");
        return Ok(ExitCode::from(2));
    };

    let config = ProbeConfig {
        timeout: Duration::from_millis(args.timeout),
        ..ProbeConfig::default()
    };
    let mut pinger: Pinger = Pinger::new(config);
    if let Some(size) = args.size {
        println!("\t packetsize {size}");
        if let Err(e) = pinger.set_payload_size(size) {
            let kept = pinger.probe().config().payload_size + ECHO_OVERHEAD;
            println!("\t {e}, keeping {kept} bytes");
        }
    }
    if args.no_fragment {
        println!("\t fragmentation control is not implemented");
    }
    println!("\t ping '{destination}'");

    let (success, result) = pinger.check(&destination);
    println!("Ping: {}", if success { "ok" } else { "fail" });
    print!("{}", result.status);

    Ok(ExitCode::SUCCESS)
}
