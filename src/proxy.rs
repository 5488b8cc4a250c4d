// ABOUTME: Renders the reverse-proxy rule served by the frontend image.
// ABOUTME: Forwards the API prefix to the backend and serves the single-page app.

use crate::config::ProxyConfig;

/// nginx `server` block for a proxy rule.
pub fn render_proxy(proxy: &ProxyConfig) -> String {
    format!(
        "server {{
    listen {listen};
    server_name _;

    root {root};
    index index.html;

    location {prefix} {{
        proxy_pass http://{service}:{port};
        proxy_http_version 1.1;
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
    }}

    location / {{
        try_files $uri $uri/ /index.html;
    }}
}}
",
        listen = proxy.listen,
        root = proxy.root,
        prefix = proxy.prefix,
        service = proxy.service,
        port = proxy.port,
    )
}
