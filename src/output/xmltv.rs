//! XMLTV document rendering.

use chrono::{DateTime, FixedOffset};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::borrow::Cow;
use tracing::debug;

use crate::config::OutputConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{Channel, Programme, Schedule};
use crate::utils::time::ZoneSpec;

const XMLTV_TIME_FORMAT: &str = "%Y%m%d%H%M%S %z";
const XMLTV_DATE_FORMAT: &str = "%Y%m%d";

/// Renders a [`Schedule`] as a tab-indented XMLTV document
pub struct XmltvRenderer<'a> {
    config: &'a OutputConfig,
    zone: ZoneSpec,
}

impl<'a> XmltvRenderer<'a> {
    pub fn new(config: &'a OutputConfig) -> AppResult<Self> {
        Ok(Self {
            config,
            zone: config.zone()?,
        })
    }

    /// UTF-8 document bytes, declaration first, trailing newline last
    pub fn render(&self, schedule: &Schedule) -> AppResult<Vec<u8>> {
        debug!(
            "Rendering {} channels and {} programmes, timestamps in {}",
            schedule.channels.len(),
            schedule.programmes.len(),
            self.zone
        );
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);

        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
        )?;
        emit(
            &mut writer,
            Event::Start(BytesStart::new("tv").with_attributes([
                ("generator-info-name", xml_chars(&self.config.generator_name).as_ref()),
                ("generator-info-url", xml_chars(&self.config.generator_url).as_ref()),
            ])),
        )?;

        for channel in &schedule.channels {
            self.write_channel(&mut writer, channel)?;
        }
        for programme in &schedule.programmes {
            self.write_programme(&mut writer, programme)?;
        }

        emit(&mut writer, Event::End(BytesEnd::new("tv")))?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// XMLTV timestamp in the run's output zone
    pub fn format_time(&self, instant: &DateTime<FixedOffset>) -> String {
        self.zone.apply(instant).format(XMLTV_TIME_FORMAT).to_string()
    }

    fn write_channel(&self, writer: &mut Writer<Vec<u8>>, channel: &Channel) -> AppResult<()> {
        emit(
            writer,
            Event::Start(BytesStart::new("channel").with_attributes([("id", xml_chars(&channel.id).as_ref())])),
        )?;
        text_element(writer, "display-name", &channel.title)?;
        if let Some(icon) = &channel.icon {
            icon_element(writer, icon)?;
        }
        emit(writer, Event::End(BytesEnd::new("channel")))
    }

    fn write_programme(&self, writer: &mut Writer<Vec<u8>>, programme: &Programme) -> AppResult<()> {
        let start = self.format_time(&programme.start);
        let stop = self.format_time(&programme.stop);

        emit(
            writer,
            Event::Start(BytesStart::new("programme").with_attributes([
                ("start", start.as_str()),
                ("stop", stop.as_str()),
                ("channel", xml_chars(&programme.channel_id).as_ref()),
                ("catchup-id", xml_chars(&programme.catchup_id).as_ref()),
            ])),
        )?;

        text_element(writer, "title", &programme.title)?;
        text_element(writer, "sub-title", &programme.subtitle)?;
        text_element(writer, "desc", &programme.description)?;
        if self.config.include_date {
            let date = self
                .zone
                .apply(&programme.start)
                .format(XMLTV_DATE_FORMAT)
                .to_string();
            text_element(writer, "date", &date)?;
        }
        for category in &programme.categories {
            text_element(writer, "category", category)?;
        }
        if let Some(icon) = &programme.icon {
            icon_element(writer, icon)?;
        }

        emit(writer, Event::End(BytesEnd::new("programme")))
    }
}

/// Drop characters outside the XML 1.0 `Char` production
fn xml_chars(text: &str) -> Cow<'_, str> {
    fn allowed(ch: char) -> bool {
        matches!(ch, '\t' | '\n' | '\r') || (ch >= '\u{20}' && !matches!(ch, '\u{FFFE}' | '\u{FFFF}'))
    }

    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&ch| allowed(ch)).collect())
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> AppResult<()> {
    writer
        .write_event(event)
        .map_err(|e| AppError::xml(e.to_string()))
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> AppResult<()> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(&xml_chars(text))))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn icon_element(writer: &mut Writer<Vec<u8>>, src: &str) -> AppResult<()> {
    emit(
        writer,
        Event::Empty(BytesStart::new("icon").with_attributes([("src", xml_chars(src).as_ref())])),
    )
}
