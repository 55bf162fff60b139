use anyhow::Result;
use enlighten_site::config::{self, ServerArgs};
use enlighten_site::server::{handler, http};
use std::net::{Ipv4Addr, SocketAddr};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match ServerArgs::parse_args_and_env(std::env::args_os(), |name| {
        std::env::var(name).ok()
    }) {
        Ok(args) => args,
        Err(config::Error::Args(err)) => err.exit(),
        Err(err) => return Err(err.into()),
    };

    if !args.dir.is_dir() {
        log::warn!(
            "`{}` is not a directory; every request will be a 404",
            args.dir.display()
        );
    }

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port));
    http::serve(addr, handler(&args.dir))
}
