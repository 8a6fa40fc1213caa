use clap::Parser;
use devprof::cli::{Cli, Commands, GlobalOpts};
use miette::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        Commands::List(args) => devprof::cli::commands::list::run(args, &global),
        Commands::Show(args) => devprof::cli::commands::show::run(args, &global),
        Commands::New(args) => devprof::cli::commands::new::run(args, &global),
        Commands::Edit(args) => devprof::cli::commands::edit::run(args, &global),
        Commands::Skills(args) => devprof::cli::commands::skills::run(args, &global),
        Commands::Config(cmd) => devprof::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => devprof::cli::commands::completions::run(args),
    }
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flags
fn init_logging(global: &GlobalOpts) {
    let default_level = if global.verbose {
        "devprof=debug"
    } else if global.quiet {
        "devprof=error"
    } else {
        "devprof=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
