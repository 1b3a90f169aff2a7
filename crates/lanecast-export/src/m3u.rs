//! M3U playlist generation.

use std::fmt::Write;

/// One playable playlist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// Must equal the guide's channel id for the same channel.
    pub tvg_id: String,
    pub name: String,
    pub channel_number: Option<u32>,
    pub group: String,
    /// `None` omits the attribute; `Some("")` writes it empty.
    pub logo: Option<String>,
    pub url: String,
}

/// Generate an extended M3U document.
///
/// Output is the `#EXTM3U` header followed by one `#EXTINF` line and one URL
/// line per entry, each entry separated by a blank line.
pub fn generate_playlist(entries: &[PlaylistEntry]) -> String {
    let mut out = String::new();

    writeln!(out, "#EXTM3U").unwrap();
    writeln!(out).unwrap();

    for entry in entries {
        write!(
            out,
            "#EXTINF:-1 tvg-id=\"{}\" tvg-name=\"{}\"",
            attr(&entry.tvg_id),
            attr(&entry.name)
        )
        .unwrap();
        if let Some(chno) = entry.channel_number {
            write!(out, " tvg-chno=\"{chno}\"").unwrap();
        }
        write!(out, " group-title=\"{}\"", attr(&entry.group)).unwrap();
        if let Some(logo) = &entry.logo {
            write!(out, " tvg-logo=\"{}\"", attr(logo)).unwrap();
        }
        writeln!(out, ",{}", entry.name.replace('\n', " ")).unwrap();
        writeln!(out, "{}", entry.url).unwrap();
        writeln!(out).unwrap();
    }

    out
}

/// Attribute values cannot contain quotes or line breaks.
fn attr(value: &str) -> String {
    value.replace('"', "'").replace('\n', " ")
}
