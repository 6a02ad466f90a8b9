//! CRLF line extraction over the connection's receive buffer.
//!
//! The header decoder works strictly line by line: a line is only handed out
//! once its `\r\n` terminator is actually buffered, so a request fragmented
//! across TCP segments is handled by simply calling again with more bytes.
//! Consumed lines are split off the front of the buffer, which keeps memory
//! bounded to the unconsumed tail.

use bytes::{Buf, BytesMut};

/// Raised when a line (terminated or not) cannot fit the caller's limit.
///
/// The header decoder translates this into `UriTooLong` or `HeaderTooLarge`
/// depending on which line was being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineTooLong {
    pub len: usize,
}

/// Splits the next CRLF-terminated line (without its terminator) off the
/// front of `src`.
///
/// Returns `Ok(None)` while the terminator has not arrived yet. An
/// unterminated prefix already longer than `max_len` fails immediately: a
/// client must not be able to grow a line without bound by withholding the
/// terminator.
pub(crate) fn next_line(src: &mut BytesMut, max_len: usize) -> Result<Option<BytesMut>, LineTooLong> {
    match src.windows(2).position(|window| window == b"\r\n") {
        Some(pos) => {
            if pos > max_len {
                return Err(LineTooLong { len: pos });
            }
            let line = src.split_to(pos);
            src.advance(2);
            Ok(Some(line))
        }
        None => {
            // the last buffered byte may still turn out to be the CR of the
            // terminator, so only lengths beyond max_len + 1 are hopeless
            if src.len() > max_len + 1 {
                Err(LineTooLong { len: src.len() })
            } else {
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_line_is_consumed() {
        let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: x\r\n"[..]);
        let line = next_line(&mut buffer, 100).unwrap().unwrap();
        assert_eq!(&line[..], b"GET / HTTP/1.1");
        assert_eq!(&buffer[..], b"Host: x\r\n");
    }

    #[test]
    fn empty_line_marks_section_end() {
        let mut buffer = BytesMut::from(&b"\r\nrest"[..]);
        let line = next_line(&mut buffer, 100).unwrap().unwrap();
        assert!(line.is_empty());
        assert_eq!(&buffer[..], b"rest");
    }

    #[test]
    fn partial_line_waits_for_terminator() {
        let mut buffer = BytesMut::from(&b"GET / HT"[..]);
        assert_eq!(next_line(&mut buffer, 100).unwrap(), None);
        assert_eq!(&buffer[..], b"GET / HT");

        buffer.extend_from_slice(b"TP/1.1\r\n");
        let line = next_line(&mut buffer, 100).unwrap().unwrap();
        assert_eq!(&line[..], b"GET / HTTP/1.1");
    }

    #[test]
    fn terminated_line_over_limit_fails() {
        let mut buffer = BytesMut::from(&b"0123456789\r\n"[..]);
        let err = next_line(&mut buffer, 9).unwrap_err();
        assert_eq!(err.len, 10);
    }

    #[test]
    fn unterminated_line_over_limit_fails_without_terminator() {
        let mut buffer = BytesMut::from(&vec![b'A'; 50][..]);
        assert!(next_line(&mut buffer, 10).is_err());
    }

    #[test]
    fn unterminated_line_at_limit_is_still_pending() {
        // 11 bytes against a limit of 10: the last byte could be the CR
        let mut buffer = BytesMut::from(&b"0123456789\r"[..]);
        assert_eq!(next_line(&mut buffer, 10).unwrap(), None);

        buffer.extend_from_slice(b"\n");
        let line = next_line(&mut buffer, 10).unwrap().unwrap();
        assert_eq!(line.len(), 10);
    }

    #[test]
    fn lone_lf_does_not_terminate() {
        let mut buffer = BytesMut::from(&b"abc\ndef"[..]);
        assert_eq!(next_line(&mut buffer, 100).unwrap(), None);
    }
}
