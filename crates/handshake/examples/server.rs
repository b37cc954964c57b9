use std::convert::Infallible;
use std::sync::Arc;

use micro_handshake::connection::PipelineConnection;
use micro_handshake::handler::make_handler;
use micro_handshake::protocol::Message;
use tokio::net::TcpListener;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!(port = 8001, "start listening");
    let tcp_listener = match TcpListener::bind("0.0.0.0:8001").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    let handler = Arc::new(make_handler(print_message));

    loop {
        let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        let handler = Arc::clone(&handler);

        tokio::spawn(async move {
            let (reader, _writer) = tcp_stream.into_split();
            match PipelineConnection::new(reader).process(handler).await {
                Ok(()) => info!(%remote_addr, "finished process, connection shutdown"),
                Err(e) => error!(%remote_addr, "connection has error, cause {}", e),
            }
        });
    }
}

async fn print_message(message: Message) -> Result<(), Infallible> {
    match message {
        Message::Handshake(header) => {
            info!(request_line = %header.request_line(), "handshake");
            for (name, value) in header.headers().iter() {
                info!(name, value, "header");
            }
        }
        Message::Frame(frame) => match frame.as_text() {
            Ok(text) => info!(opcode = ?frame.opcode(), text, "frame"),
            Err(_) => info!(opcode = ?frame.opcode(), len = frame.payload().len(), "frame"),
        },
    }
    Ok(())
}
