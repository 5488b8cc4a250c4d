// ABOUTME: Render command implementation.
// ABOUTME: Prints the compose file or reverse-proxy rule derived from the config.

use crate::cli::RenderTarget;
use shipline::config::Config;
use shipline::error::Result;
use shipline::proxy::render_proxy;
use shipline::topology::render_compose;

pub fn render(config: &Config, target: RenderTarget) -> Result<()> {
    let rendered = match target {
        RenderTarget::Compose => render_compose(&config.topology()?)?,
        RenderTarget::Proxy => render_proxy(&config.proxy),
    };
    print!("{rendered}");
    Ok(())
}
