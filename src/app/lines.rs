use std::io::{self, BufRead};

/// Reads one line into `buf`, treating `\n`, `\r\n` and a lone `\r` as line
/// ends. Whatever the terminator, it is appended as a single `\n`.
///
/// Returns the number of bytes consumed from `reader`; 0 means end of input.
pub fn read_line_normalized<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<usize> {
    let mut consumed = 0;

    loop {
        let (terminator, used) = {
            let available = match reader.fill_buf() {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            if available.is_empty() {
                return Ok(consumed);
            }

            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(i) => {
                    buf.extend_from_slice(&available[..i]);
                    buf.push(b'\n');
                    (Some(available[i]), i + 1)
                }
                None => {
                    buf.extend_from_slice(available);
                    (None, available.len())
                }
            }
        };
        reader.consume(used);
        consumed += used;

        match terminator {
            Some(b'\r') => {
                // Fold the `\n` of a `\r\n` pair into the same line end.
                if reader.fill_buf()?.first() == Some(&b'\n') {
                    reader.consume(1);
                    consumed += 1;
                }
                return Ok(consumed);
            }
            Some(_) => return Ok(consumed),
            None => {}
        }
    }
}
