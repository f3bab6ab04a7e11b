//! Starting the simulator as a child process

use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::process::{Child, Command};
use std::thread;
use std::time::Duration;

use log::{debug, info};

use super::client::TraciClient;
use crate::simulation::{Result, RunConfig, SimError};

/// How many times to poll the port of a freshly started simulator
pub const CONNECT_ATTEMPTS: u32 = 60;

/// Delay between two connection polls
pub const CONNECT_INTERVAL: Duration = Duration::from_millis(500);

/// Ask the OS for a port that is free right now
fn free_port() -> Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    Ok(listener.local_addr()?.port())
}

/// Kill a process we gave up on, ignoring a process that already exited
fn abandon(mut process: Child) {
    let _ = process.kill();
    let _ = process.wait();
}

/// Launch the simulator for `config` and connect to it.
///
/// The configuration is validated first, so a missing scenario file never
/// starts a process. The returned client owns the process and reaps it on
/// close.
pub fn launch(config: &RunConfig) -> Result<TraciClient> {
    config.validate()?;

    let binary = config.sumo_home.binary(config.gui);
    let port = free_port()?;
    let mut command = Command::new(&binary);
    command
        .args(config.simulator_args())
        .arg("--remote-port")
        .arg(port.to_string());
    debug!("Launching {:?}", command);

    let mut process = command.spawn().map_err(|e| {
        SimError::communication(format!("failed to start '{}': {}", binary.display(), e))
    })?;
    info!("Started {} on port {}", binary.display(), port);

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    for attempt in 1..=CONNECT_ATTEMPTS {
        match process.try_wait() {
            Ok(Some(status)) => {
                return Err(SimError::communication(format!(
                    "simulator exited before accepting a connection ({})",
                    status
                )))
            }
            Ok(None) => {}
            Err(e) => {
                abandon(process);
                return Err(e.into());
            }
        }

        match TcpStream::connect(addr) {
            Ok(stream) => {
                return match TraciClient::from_stream(stream) {
                    Ok(mut client) => {
                        client.attach_process(process);
                        Ok(client)
                    }
                    Err(e) => {
                        abandon(process);
                        Err(e)
                    }
                };
            }
            Err(e) => {
                debug!("Connection attempt {} to {} failed: {}", attempt, addr, e);
                thread::sleep(CONNECT_INTERVAL);
            }
        }
    }

    abandon(process);
    Err(SimError::communication(format!(
        "simulator did not accept a connection on {} after {} attempts",
        addr, CONNECT_ATTEMPTS
    )))
}
