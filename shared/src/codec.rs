//! Length-prefixed packet framing over a byte stream
//!
//! Each frame is a big-endian `u32` byte count followed by a bincode-encoded [`Packet`].

use crate::Packet;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame either side will send or accept
pub const MAX_FRAME_LEN: usize = 64 * 1024;

pub fn encode(packet: &Packet) -> io::Result<Vec<u8>> {
    let payload =
        bincode::serialize(packet).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds {}", payload.len(), MAX_FRAME_LEN),
        ));
    }

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode(packet)?;
    writer.write_all(&frame).await?;
    writer.flush().await
}

/// Reads the next packet, or `None` once the peer has closed the stream between frames
pub async fn read_packet<R>(reader: &mut R) -> io::Result<Option<Packet>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream closed after {} header bytes", filled),
            ));
        }
        filled += n;
    }
    let len = u32::from_be_bytes(header) as usize;

    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds {}", len, MAX_FRAME_LEN),
        ));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;

    bincode::deserialize(&payload)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::Direction;
    use crate::rules::MoveRequest;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_read_single_frame() {
        let packet = Packet::Connected { client_id: 9 };
        let frame = encode(&packet).unwrap();
        let mut reader = Builder::new().read(&frame).build();

        match read_packet(&mut reader).await.unwrap() {
            Some(Packet::Connected { client_id }) => assert_eq!(client_id, 9),
            other => panic!("Unexpected packet: {:?}", other),
        }
        assert!(read_packet(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_frame_split_across_reads() {
        let request: MoveRequest = "C3 C5 TOP_RIGHT".parse().unwrap();
        let frame = encode(&Packet::Move { request }).unwrap();
        let (head, tail) = frame.split_at(3);
        let mut reader = Builder::new().read(head).read(tail).build();

        match read_packet(&mut reader).await.unwrap() {
            Some(Packet::Move { request }) => {
                assert_eq!(request.marble1.to_string(), "C3");
                assert_eq!(request.marble2.to_string(), "C5");
                assert_eq!(request.direction, Direction::TopRight);
            }
            other => panic!("Unexpected packet: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_partial_header_is_an_error() {
        let frame = encode(&Packet::Forfeit).unwrap();
        let mut reader = Builder::new().read(&frame[..1]).read(&frame[1..3]).build();

        let err = read_packet(&mut reader).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_write_matches_encode() {
        let packet = Packet::Forfeit;
        let frame = encode(&packet).unwrap();
        let mut writer = Builder::new().write(&frame).build();

        write_packet(&mut writer, &packet).await.unwrap();
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let header = ((MAX_FRAME_LEN + 1) as u32).to_be_bytes();
        let mut reader = Builder::new().read(&header).build();

        let err = read_packet(&mut reader).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_truncated_payload_is_an_error() {
        let frame = encode(&Packet::Disconnect).unwrap();
        let mut short = frame.clone();
        short[3] += 4;
        let mut reader = Builder::new().read(&short).build();

        assert!(read_packet(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_payload_is_invalid_data() {
        let mut frame = 2u32.to_be_bytes().to_vec();
        frame.extend_from_slice(&[0xff, 0xff]);
        let mut reader = Builder::new().read(&frame).build();

        let err = read_packet(&mut reader).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
