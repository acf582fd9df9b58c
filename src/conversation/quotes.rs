//! Quote splitting and quote-level segmentation.
//!
//! A reply thread in plain text keeps older messages as `>`-prefixed lines.
//! The shallowest quoting belongs to the most recent reply, so walking the
//! quoted lines bottom-up and cutting whenever the depth gets shallower
//! yields one chunk per original message, newest first.

/// Result of separating unquoted text from quoted lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitBody {
    pub latest_message: String,
    pub quoted_lines: Vec<String>,
}

/// Separate lines starting with `>` from everything else.
///
/// Unquoted lines keep their order and are joined and trimmed.
pub fn split_quoted_and_latest(body: &str) -> SplitBody {
    let mut latest_lines = Vec::new();
    let mut quoted_lines = Vec::new();

    for line in body.split('\n') {
        if line.starts_with('>') {
            quoted_lines.push(line.to_string());
        } else {
            latest_lines.push(line);
        }
    }

    SplitBody {
        latest_message: latest_lines.join("\n").trim().to_string(),
        quoted_lines,
    }
}

/// Number of consecutive leading `>` characters.
pub fn quote_level(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b'>').count()
}

/// Quote level counting every `>` in a leading run of `>`, spaces and tabs.
///
/// `"> > text"` is level 2 here and level 1 for [`quote_level`].
pub fn spaced_quote_level(line: &str) -> usize {
    quote_prefix_len(line, true).1
}

/// Byte length of the quote prefix and the level it represents.
fn quote_prefix_len(line: &str, spaced: bool) -> (usize, usize) {
    if !spaced {
        let level = quote_level(line);
        return (level, level);
    }

    let mut level = 0;
    let mut prefix_end = 0;
    for (idx, b) in line.bytes().enumerate() {
        match b {
            b'>' => {
                level += 1;
                prefix_end = idx + 1;
            }
            b' ' | b'\t' => {}
            _ => break,
        }
    }
    (prefix_end, level)
}

/// Group quoted lines into one chunk per original message.
///
/// Lines are visited from the bottom up. A line quoted strictly shallower
/// than everything buffered so far closes the buffer as a finished chunk.
/// Quote markers are stripped from each line and every chunk is trimmed.
/// The returned chunks are ordered newest (shallowest) first.
pub fn extract_quoted_messages(quoted_lines: &[String], spaced: bool) -> Vec<String> {
    let mut messages: Vec<String> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut current_min_level = 0;

    for line in quoted_lines.iter().rev() {
        let (prefix_len, level) = quote_prefix_len(line, spaced);
        let content = line[prefix_len..].trim();

        if buffer.is_empty() {
            current_min_level = level;
        } else if level < current_min_level {
            messages.push(flush(&mut buffer));
            current_min_level = level;
        }
        buffer.push(content);
    }

    if !buffer.is_empty() {
        messages.push(flush(&mut buffer));
    }

    // Chunks were closed bottom-up.
    messages.reverse();
    log::trace!("segmented {} quoted lines into {} chunks", quoted_lines.len(), messages.len());
    messages
}

fn flush(buffer: &mut Vec<&str>) -> String {
    buffer.reverse();
    let chunk = buffer.join("\n").trim().to_string();
    buffer.clear();
    chunk
}
