//! IPC server implementation
//!
//! Listens on localhost TCP for admin requests from operator tools.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use epa_core::ipc::{IpcRequest, IpcResponse};
use epa_core::{AdminError, ClientId, Principal};

use crate::state::AdminState;

/// Principal name for callers holding the static access token
const TOKEN_PRINCIPAL: &str = "access-token";

/// IPC server for operator tools
///
/// Listens on localhost (127.0.0.1) only - not accessible from network.
pub struct IpcServer {
    /// Address to bind (127.0.0.1:port)
    pub address: String,
    /// Admin daemon state
    state: Arc<AdminState>,
    /// Cancellation token for shutdown
    shutdown_token: CancellationToken,
}

impl IpcServer {
    /// Create a new IPC server
    pub fn new(address: String, state: Arc<AdminState>) -> Self {
        Self {
            address,
            state,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Set the shutdown token (call before run)
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown_token = token;
        self
    }

    /// Run the IPC server until the shutdown token is cancelled
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.address)
            .await
            .with_context(|| format!("Failed to bind IPC server to {}", self.address))?;

        tracing::info!("IPC server listening on {}", self.address);

        loop {
            let accepted = tokio::select! {
                _ = self.shutdown_token.cancelled() => break,
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer_addr)) => {
                    // Only accept connections from localhost
                    if !peer_addr.ip().is_loopback() {
                        tracing::warn!("Rejected non-localhost connection from {}", peer_addr);
                        continue;
                    }

                    let state = Arc::clone(&self.state);
                    let shutdown_token = self.shutdown_token.clone();

                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, state, shutdown_token).await {
                            tracing::warn!("IPC client error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept IPC connection: {}", e);
                }
            }
        }

        tracing::info!("IPC server stopped");
        Ok(())
    }
}

/// State for a single IPC connection
#[derive(Default)]
struct ConnectionState {
    /// Token accepted by `Authenticate`
    token: Option<String>,
}

async fn handle_client(
    stream: TcpStream,
    state: Arc<AdminState>,
    shutdown_token: CancellationToken,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    let mut connection = ConnectionState::default();

    loop {
        line.clear();
        let read = tokio::select! {
            _ = shutdown_token.cancelled() => break,
            read = reader.read_line(&mut line) => read?,
        };
        if read == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<IpcRequest>(trimmed) {
            Ok(request) => handle_request(request, &state, &mut connection).await,
            Err(e) => IpcResponse::Error {
                message: format!("Invalid request: {}", e),
            },
        };

        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
    }

    Ok(())
}

async fn handle_request(
    request: IpcRequest,
    state: &AdminState,
    connection: &mut ConnectionState,
) -> IpcResponse {
    let principal = match authorize(&request, state, connection) {
        Ok(principal) => principal,
        Err(e) => {
            return IpcResponse::Error {
                message: e.to_string(),
            }
        }
    };

    match request {
        IpcRequest::Ping => IpcResponse::Pong,
        IpcRequest::Authenticate { token } => authenticate(token, state, connection),
        request => execute(request, state, &principal)
            .await
            .unwrap_or_else(|e| IpcResponse::Error {
                message: e.to_string(),
            }),
    }
}

fn authenticate(token: String, state: &AdminState, connection: &mut ConnectionState) -> IpcResponse {
    let Some(access) = &state.access else {
        return IpcResponse::Ok;
    };

    if access.allowed("authenticate", &state.config.default_context, &token) {
        connection.token = Some(token);
        IpcResponse::Ok
    } else {
        tracing::warn!("IPC authentication failed");
        IpcResponse::Error {
            message: "Authentication failed".to_string(),
        }
    }
}

/// Resolve the principal for a request
///
/// Public requests and daemons without access control run anonymously.
fn authorize(
    request: &IpcRequest,
    state: &AdminState,
    connection: &ConnectionState,
) -> Result<Principal, AdminError> {
    let Some(access) = state.access.as_ref().filter(|_| !request.is_public()) else {
        return Ok(Principal::anonymous());
    };

    let method = request.method();
    match &connection.token {
        Some(token) if access.allowed(method, &state.config.default_context, token) => {
            Ok(Principal::new(TOKEN_PRINCIPAL))
        }
        _ => Err(AdminError::Unauthorized {
            method: method.to_string(),
        }),
    }
}

async fn execute(
    request: IpcRequest,
    state: &AdminState,
    principal: &Principal,
) -> Result<IpcResponse, AdminError> {
    let admin = &state.admin;
    let identifier = request.identifier();

    match (request, identifier) {
        (IpcRequest::ListProcessors { component }, _) => {
            let processors: Vec<_> = match component {
                Some(component) => {
                    admin
                        .event_processors_by_component(&component, principal)
                        .collect()
                        .await
                }
                None => admin.event_processors(principal).collect().await,
            };
            Ok(IpcResponse::Processors { processors })
        }
        (IpcRequest::Pause { .. }, Some(identifier)) => {
            admin.pause(&identifier, principal).await?;
            Ok(IpcResponse::Ok)
        }
        (IpcRequest::Start { .. }, Some(identifier)) => {
            admin.start(&identifier, principal).await?;
            Ok(IpcResponse::Ok)
        }
        (IpcRequest::Split { .. }, Some(identifier)) => {
            admin.split(&identifier, principal).await?;
            Ok(IpcResponse::Ok)
        }
        (IpcRequest::Merge { .. }, Some(identifier)) => {
            admin.merge(&identifier, principal).await?;
            Ok(IpcResponse::Ok)
        }
        (
            IpcRequest::MoveSegment {
                segment,
                target_client,
                ..
            },
            Some(identifier),
        ) => {
            admin
                .move_segment(&identifier, segment, &ClientId::new(target_client), principal)
                .await?;
            Ok(IpcResponse::Ok)
        }
        (request, _) => Ok(IpcResponse::Error {
            message: format!("Unsupported request: {}", request.method()),
        }),
    }
}
