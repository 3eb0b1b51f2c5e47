//! Web control surface: page serving with token substitution, websocket
//! command channel, static assets

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

use futures::{Future, StreamExt};
use warp::{http::StatusCode, ws::WebSocket, Filter};

use crate::{
    api::ClientConnection,
    global::{Global, InputSourceName},
    models::WebConfig,
};

mod template;

/// Bind the web server, returning the future serving it
pub async fn bind(
    global: Global,
    config: &WebConfig,
) -> Result<impl Future<Output = ()>, std::io::Error> {
    let document_root = PathBuf::from(&config.document_root);

    let with_global = {
        let global = global.clone();
        warp::any().map(move || global.clone())
    };

    let ws = warp::path("ws")
        .and(warp::ws())
        .and(warp::filters::addr::remote())
        .and(with_global.clone())
        .map(
            |ws: warp::ws::Ws, remote: Option<SocketAddr>, global: Global| {
                ws.on_upgrade(move |websocket| {
                    let peer_addr = remote.unwrap_or_else(|| {
                        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
                    });

                    handle_client(websocket, peer_addr, global)
                })
            },
        );

    // The control page is rendered with the current state substituted for
    // its %XY% tokens; every other asset is served verbatim
    let index = warp::get()
        .and(warp::path::end().or(warp::path!("index.html")).unify())
        .and(with_global)
        .and({
            let document_root = document_root.clone();
            warp::any().map(move || document_root.clone())
        })
        .and_then(render_index);

    let files = warp::fs::dir(document_root);

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(address).await;

    match listener {
        Ok(listener) => {
            info!(address = %address, "web server listening");
            Ok(
                warp::serve(ws.or(index).or(files).with(warp::filters::log::log(
                    "iconlamp::web",
                )))
                .run_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener)),
            )
        }
        Err(error) => Err(error),
    }
}

async fn render_index(
    global: Global,
    document_root: PathBuf,
) -> Result<Box<dyn warp::Reply>, warp::Rejection> {
    let path = document_root.join("index.html");

    match tokio::fs::read_to_string(&path).await {
        Ok(page) => {
            let rendered = global
                .read_state(|state| template::substitute(&page, state))
                .await;

            Ok(Box::new(warp::reply::html(rendered)))
        }
        Err(error) => {
            // Page serving degrades, the animation core keeps running
            error!(path = %path.display(), error = %error, "cannot serve control page");

            Ok(Box::new(warp::reply::with_status(
                "control page unavailable",
                StatusCode::INTERNAL_SERVER_ERROR,
            )))
        }
    }
}

async fn handle_client(websocket: WebSocket, peer_addr: SocketAddr, global: Global) {
    info!(peer = %peer_addr, "websocket client connected");

    let handle = global
        .register_input_source(InputSourceName::WebSocket { peer_addr })
        .await;
    let connection = ClientConnection::new(handle, global);

    let (_tx, mut rx) = websocket.split();

    while let Some(result) = rx.next().await {
        match result {
            Ok(message) => {
                if message.is_close() {
                    break;
                }

                if message.is_text() || message.is_binary() {
                    connection.handle_frame(message.as_bytes()).await;
                }
            }
            Err(error) => {
                warn!(peer = %peer_addr, error = %error, "websocket error");
                break;
            }
        }
    }

    info!(peer = %peer_addr, "websocket client disconnected");
}
