use std::sync::Arc;

use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::http::parser::{ParseError, request_from_reader};
use crate::http::request::Request;
use crate::http::response::StatusCode;
use crate::http::writer::{ResponseWriter, write_error_response};
use crate::proxy::upstream;

const OK_PAGE: &str = "<html>\n  <head><title>200 OK</title></head>\n  <body><h1>Success!</h1><p>Your request was served.</p></body>\n</html>\n";

const BAD_REQUEST_PAGE: &str = "<html>\n  <head><title>400 Bad Request</title></head>\n  <body><h1>Bad Request</h1><p>That request could not be understood.</p></body>\n</html>\n";

const INTERNAL_ERROR_PAGE: &str = "<html>\n  <head><title>500 Internal Server Error</title></head>\n  <body><h1>Internal Server Error</h1><p>Something went wrong on our side.</p></body>\n</html>\n";

/// Drives one request/response cycle over an accepted socket.
///
/// Reads and parses the request, dispatches to a handler, flushes the
/// response, then lets the connection close. There is no keep-alive: one
/// cycle per connection.
pub struct Connection {
    stream: TcpStream,
    config: Arc<Config>,
}

impl Connection {
    pub fn new(stream: TcpStream, config: Arc<Config>) -> Self {
        Self { stream, config }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let request = match request_from_reader(&mut self.stream).await {
            Ok(request) => request,
            Err(ParseError::Io(e)) => {
                // transport failure; nothing useful can be sent back
                return Err(e.into());
            }
            Err(e) => {
                warn!(error = %e, "rejecting malformed request");
                if let Err(we) =
                    write_error_response(&mut self.stream, StatusCode::BAD_REQUEST, "Bad Request\n")
                        .await
                {
                    debug!(error = %we, "failed to deliver error response");
                }
                return Ok(());
            }
        };

        info!(
            method = request.method.as_str(),
            target = %request.target,
            "handling request"
        );

        let config = Arc::clone(&self.config);
        let mut writer = ResponseWriter::new(&mut self.stream);
        dispatch(&mut writer, &request, &config).await?;
        writer.flush().await?;

        Ok(())
    }
}

/// Target-based dispatch. Everything except the proxy prefix is served
/// from embedded pages through the buffered path.
async fn dispatch(
    writer: &mut ResponseWriter<&mut TcpStream>,
    request: &Request,
    config: &Config,
) -> anyhow::Result<()> {
    let prefix = &config.upstream.route_prefix;
    if !prefix.is_empty() && request.target.starts_with(prefix.as_str()) {
        return upstream::serve_proxied(writer, request, &config.upstream).await;
    }

    match request.target.as_str() {
        "/yourproblem" => serve_page(writer, StatusCode::BAD_REQUEST, BAD_REQUEST_PAGE).await,
        "/myproblem" => serve_page(writer, StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_PAGE).await,
        _ => serve_page(writer, StatusCode::OK, OK_PAGE).await,
    }
}

async fn serve_page(
    writer: &mut ResponseWriter<&mut TcpStream>,
    status: StatusCode,
    page: &str,
) -> anyhow::Result<()> {
    writer.status = status;
    writer.write_str(page);
    writer.write_response().await?;
    Ok(())
}
