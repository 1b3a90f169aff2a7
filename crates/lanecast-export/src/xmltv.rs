//! XMLTV program-guide writer.
//!
//! Channels are written before programmes, each programme carrying
//! `start`/`stop` in `YYYYMMDDHHMMSS +0000` form.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use lanecast_core::time::xmltv_time;
use lanecast_core::{Error, Result};

use crate::programme::Programme;

/// One `<channel>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideChannel {
    pub id: String,
    pub display_name: String,
    pub icon: Option<String>,
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn xml_error(e: impl std::fmt::Display) -> Error {
    Error::export("xmltv", e)
}

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(xml_error)
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn icon_element(writer: &mut XmlWriter, src: &str) -> Result<()> {
    let mut icon = BytesStart::new("icon");
    icon.push_attribute(("src", src));
    write(writer, Event::Empty(icon))
}

/// Render a complete guide document.
pub fn write_guide(
    generator: &str,
    channels: &[GuideChannel],
    programmes: &[Programme],
) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut tv = BytesStart::new("tv");
    tv.push_attribute(("generator-info-name", generator));
    write(&mut writer, Event::Start(tv))?;

    for channel in channels {
        let mut start = BytesStart::new("channel");
        start.push_attribute(("id", channel.id.as_str()));
        write(&mut writer, Event::Start(start))?;
        text_element(&mut writer, "display-name", &channel.display_name)?;
        if let Some(icon) = &channel.icon {
            icon_element(&mut writer, icon)?;
        }
        write(&mut writer, Event::End(BytesEnd::new("channel")))?;
    }

    for programme in programmes {
        let mut start = BytesStart::new("programme");
        start.push_attribute(("channel", programme.channel.as_str()));
        start.push_attribute(("start", xmltv_time(programme.start).as_str()));
        start.push_attribute(("stop", xmltv_time(programme.stop).as_str()));
        write(&mut writer, Event::Start(start))?;

        text_element(&mut writer, "title", &programme.title)?;
        if let Some(desc) = &programme.description {
            text_element(&mut writer, "desc", desc)?;
        }
        for category in &programme.categories {
            text_element(&mut writer, "category", category)?;
        }
        if let Some(icon) = &programme.icon {
            icon_element(&mut writer, icon)?;
        }
        if programme.live {
            text_element(&mut writer, "live", "1")?;
        }

        write(&mut writer, Event::End(BytesEnd::new("programme")))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("tv")))?;

    let mut bytes = writer.into_inner().into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(xml_error)
}
