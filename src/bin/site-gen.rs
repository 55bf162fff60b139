use clap::Parser;
use enlighten_site::build::generate;
use enlighten_site::config::GeneratorArgs;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = GeneratorArgs::parse();
    if let Err(err) = generate(&args.src, &args.dest) {
        eprintln!("generating site: {}", err);
        std::process::exit(1);
    }
}
