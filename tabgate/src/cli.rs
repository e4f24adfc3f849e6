use clap::App;
use clap::Arg;
use clap::ArgMatches;

pub fn init() -> ArgMatches<'static> {
    app().get_matches()
}

fn app() -> App<'static, 'static> {
    App::new("tabgate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A native-messaging gateway that mirrors browser tabs to local clients over a unix socket.")
        .arg(
            Arg::with_name("LAUNCH")
                .long("_launch")
                .required(false)
                .hidden(true)
                .takes_value(true)
                .possible_values(&["gateway"])
                .help("launched by the browser's native-messaging manifest"),
        )
        .arg(
            Arg::with_name("LIST")
                .short("l")
                .long("list")
                .display_order(0)
                .help("prints the open tabs"),
        )
        .arg(
            Arg::with_name("FOLLOW")
                .short("f")
                .long("follow")
                .display_order(1)
                .conflicts_with("LIST")
                .help("streams tab events to stdout (the default)"),
        )
        .arg(
            Arg::with_name("LOG")
                .long("log")
                .takes_value(true)
                .possible_values(&["off", "error", "warn", "info", "debug", "trace"])
                .help("sets the log level"),
        )
}
