//! Send a few frames over a loopback TCP connection and read them back.
//!
//! Run with:
//!   cargo run --example pipe-roundtrip

use std::net::{TcpListener, TcpStream};
use std::thread;

use markframe::{FrameReader, FrameWriter, MARKER_BYTES};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let sender = thread::spawn(move || -> markframe::Result<()> {
        let stream = TcpStream::connect(addr)?;
        let mut writer = FrameWriter::new(stream);
        writer.send(b"hello")?;
        // Marker bytes inside a payload are threaded out and restored on read.
        writer.send(&[b"before-".as_slice(), &MARKER_BYTES, b"-after"].concat())?;
        writer.send(&vec![0x5A; 32 * 1024])?;
        Ok(())
    });

    let (stream, peer) = listener.accept()?;
    eprintln!("Connected: {peer}");

    let reader = FrameReader::new(stream);
    for frame in reader {
        let frame = frame?;
        eprintln!("Received frame of {} bytes", frame.len());
    }

    sender.join().map_err(|_| "sender thread panicked")??;
    Ok(())
}
