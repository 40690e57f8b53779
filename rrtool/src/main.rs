use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use rrlib::setting::{LogSetting, Settings};
use rrproto::RecordCodec;
use slog::{Drain, Level, Logger};
#[macro_use]
extern crate slog;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

fn log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "critical" => Level::Critical,
        "error" => Level::Error,
        "warning" => Level::Warning,
        "debug" => Level::Debug,
        "trace" => Level::Trace,
        _ => Level::Info,
    }
}

fn build_logger(setting: &LogSetting) -> Logger {
    let decorator = if setting.target == "stderr" {
        slog_term::TermDecorator::new().stderr().build()
    } else {
        slog_term::TermDecorator::new().stdout().build()
    };
    let level = log_level(setting.level.as_str());
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(level).fuse();
    slog::Logger::root(drain, o!("version" => version()))
}

fn load_settings(matches: &ArgMatches) -> Result<Settings, String> {
    let mut setting = match matches.value_of("config") {
        Some(path) => Settings::load(path).map_err(|err| err.to_string())?,
        None => Settings::default(),
    };
    if let Some(level) = matches.value_of("loglevel") {
        setting.log.level = level.to_lowercase();
    }
    Ok(setting)
}

fn run(matches: &ArgMatches, codec: &RecordCodec, logger: &Logger) -> Result<(), String> {
    match matches.subcommand() {
        ("encode", Some(sub)) => {
            let line = sub.value_of("line").unwrap_or_default();
            let record = codec.parse_line(line).map_err(|err| err.to_string())?;
            let wire = codec
                .encode_records(&[record])
                .map_err(|err| err.to_string())?;
            info!(logger, "encoded record"; "octets" => wire.len());
            println!("{}", HEXLOWER.encode(wire.as_slice()));
            Ok(())
        }
        ("decode", Some(sub)) => {
            let hex = sub.value_of("hex").unwrap_or_default();
            let wire = HEXLOWER_PERMISSIVE
                .decode(hex.trim().as_bytes())
                .map_err(|err| format!("input is not hex: {}", err))?;
            let records = codec
                .decode_records(wire.as_slice(), 0)
                .map_err(|err| err.to_string())?;
            info!(logger, "decoded records"; "count" => records.len());
            for record in records {
                println!("{}", record);
            }
            Ok(())
        }
        _ => Err("no subcommand given".to_owned()),
    }
}

fn main() {
    let matches = App::new("rrtool")
        .version(version())
        .author("mike zhang. <zhangmingkai.1989@gmail.com>")
        .about("encode and decode SVCB, HTTPS, HIP, NID and NULL resource records")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .help("config file path")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("loglevel")
                .long("log-level")
                .validator(|v| match v.to_lowercase().as_str() {
                    "critical" | "error" | "warning" | "info" | "debug" | "trace" => Ok(()),
                    _ => Err(String::from("unknown log level")),
                })
                .help("set the level of log output")
                .takes_value(true),
        )
        .subcommand(
            SubCommand::with_name("encode")
                .about("encode a zone file line to wire format hex")
                .arg(Arg::with_name("line").required(true).help("zone file line")),
        )
        .subcommand(
            SubCommand::with_name("decode")
                .about("decode wire format hex to zone file lines")
                .arg(Arg::with_name("hex").required(true).help("records in hex")),
        )
        .get_matches();

    let setting = match load_settings(&matches) {
        Ok(setting) => setting,
        Err(err) => {
            eprintln!("setting error: {}", err);
            std::process::exit(2);
        }
    };
    // the async drain flushes when the last logger handle is dropped
    let code = {
        let logger = build_logger(&setting.log);
        match RecordCodec::new(&setting.codec, logger.clone()) {
            Ok(codec) => match run(&matches, &codec, &logger) {
                Ok(()) => 0,
                Err(err) => {
                    error!(logger, "{}", err);
                    1
                }
            },
            Err(err) => {
                error!(logger, "setting error: {}", err);
                2
            }
        }
    };
    std::process::exit(code);
}
