//! Line-oriented TCP server. One command per line in, one response out,
//! each response terminated by a line holding the EOT character.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;

use tracing::{error, info};

use crate::error::Result;
use crate::sql::engine::Session;
use crate::storage::DatabaseManager;

/// Terminates every response so clients know when to stop reading
const END_OF_TRANSMISSION: char = '\u{4}';

/// Binds the listener and serves connections one at a time, all sharing a
/// single session over the same storage root
pub fn serve(data_dir: PathBuf, port: u16) -> Result<()> {
    let mut session = Session::new(DatabaseManager::open(data_dir)?);
    let listener = TcpListener::bind(("0.0.0.0", port))?;
    info!(port, "server listening");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(err) = handle_connection(stream, &mut session) {
                    error!(%err, "connection failed");
                }
            }
            Err(err) => error!(%err, "accept failed"),
        }
    }
    Ok(())
}

/// Reads commands line by line until the client disconnects
fn handle_connection(mut stream: TcpStream, session: &mut Session) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let command = line.trim_end_matches(['\r', '\n']);
        info!(command, "received");
        let response = session.execute(command);
        write!(stream, "{}\n{}\n", response, END_OF_TRANSMISSION)?;
        stream.flush()?;
    }
}
