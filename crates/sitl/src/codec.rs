//! TNC2-style text codec
//!
//! Stands in for the wire-format collaborator the embedded build gets from
//! its APRS library. Frames look like
//! `N0CALL-7>APRS,WIDE1-1*:payload` with the usual payload leads: `!` for
//! positions, `>` for status, `:` for messages and acks (with the `{NNN`
//! delivery-id suffix), `T#` for telemetry.
//!
//! Consumed hops carry a trailing `*`. Positions round-trip through the
//! DDMM.hh notation, so decoded coordinates are only accurate to about
//! 20 m; scenario assertions use tolerances accordingly.

use aprs_tracker_core::{Callsign, Payload, PathHop, RxPacket, SensorReadings, TxPacket};

use crate::error::SimulatorError;

fn push_limited<const N: usize>(out: &mut heapless::String<N>, text: &str) {
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
}

fn encode_lat(lat: f32) -> String {
    let hemisphere = if lat < 0.0 { 'S' } else { 'N' };
    let degrees = lat.abs();
    let whole = degrees.floor();
    let minutes = (degrees - whole) * 60.0;
    format!("{:02}{:05.2}{}", whole as u32, minutes, hemisphere)
}

fn encode_lon(lon: f32) -> String {
    let hemisphere = if lon < 0.0 { 'W' } else { 'E' };
    let degrees = lon.abs();
    let whole = degrees.floor();
    let minutes = (degrees - whole) * 60.0;
    format!("{:03}{:05.2}{}", whole as u32, minutes, hemisphere)
}

fn decode_coordinate(text: &str, degree_digits: usize) -> Option<f32> {
    if text.len() < degree_digits + 6 {
        return None;
    }
    let whole: f32 = text[..degree_digits].parse().ok()?;
    let minutes: f32 = text[degree_digits..degree_digits + 5].parse().ok()?;
    let hemisphere = text.chars().last()?;
    let value = whole + minutes / 60.0;
    match hemisphere {
        'N' | 'E' => Some(value),
        'S' | 'W' => Some(-value),
        _ => None,
    }
}

fn encode_payload(payload: &Payload) -> String {
    match payload {
        Payload::Position {
            lat,
            lon,
            speed_kmh,
            course_deg,
            symbol_table,
            symbol_code,
            comment,
        } => {
            let course = (course_deg.round() as i32).rem_euclid(360) as u32;
            let speed = speed_kmh.round().max(0.0).min(999.0) as u32;
            let mut text = format!(
                "!{}{}{}{}{:03}/{:03}",
                encode_lat(*lat),
                *symbol_table as char,
                encode_lon(*lon),
                *symbol_code as char,
                course,
                speed
            );
            if let Some(comment) = comment {
                text.push_str(comment.as_str());
            }
            text
        }
        Payload::Status(text) => format!(">{}", text),
        Payload::Message {
            addressee,
            text,
            id,
        } => match id {
            Some(id) => format!(":{:<9}:{}{{{}", addressee.as_str(), text, id),
            None => format!(":{:<9}:{}", addressee.as_str(), text),
        },
        Payload::Ack { addressee, id } => format!(":{:<9}:ack{}", addressee.as_str(), id),
        Payload::Telemetry { sequence, readings } => format!(
            "T#{:03},{:.2},{:.1},{:.1},{:.1}",
            sequence,
            readings.battery_v,
            readings.temperature_c,
            readings.pressure_hpa,
            readings.humidity_pct
        ),
        Payload::Other(text) => text.as_str().to_string(),
    }
}

/// Encode a logical packet to one TNC2-style text frame.
pub fn encode_wire(packet: &TxPacket) -> String {
    let mut frame = format!("{}>{}", packet.source.as_str(), packet.destination.as_str());
    for hop in &packet.path {
        frame.push(',');
        frame.push_str(hop.call.as_str());
        if hop.used {
            frame.push('*');
        }
    }
    frame.push(':');
    frame.push_str(&encode_payload(&packet.payload));
    frame
}

fn parse_callsign(text: &str) -> Result<Callsign, SimulatorError> {
    Callsign::new(text).ok_or_else(|| SimulatorError::InvalidCallsign(text.to_string()))
}

fn decode_position(body: &str) -> Option<Payload> {
    // !DDMM.hhN T DDDMM.hhE C CCC/SSS [comment]
    if body.len() < 26 || !body.is_char_boundary(26) || !body[..26].is_ascii() {
        return None;
    }
    let lat = decode_coordinate(&body[..8], 2)?;
    let symbol_table = body.as_bytes()[8];
    let lon = decode_coordinate(&body[9..18], 3)?;
    let symbol_code = body.as_bytes()[18];
    let course_deg: f32 = body[19..22].parse().ok()?;
    if body.as_bytes()[22] != b'/' {
        return None;
    }
    let speed_kmh: f32 = body[23..26].parse().ok()?;
    let comment_text = &body[26..];
    let comment = if comment_text.is_empty() {
        None
    } else {
        let mut comment = heapless::String::new();
        push_limited(&mut comment, comment_text);
        Some(comment)
    };
    Some(Payload::Position {
        lat,
        lon,
        speed_kmh,
        course_deg,
        symbol_table,
        symbol_code,
        comment,
    })
}

fn decode_directed(body: &str) -> Option<Payload> {
    // :ADDRESSEE:text  with addressee space-padded to 9 chars
    if body.len() < 10 || !body.is_char_boundary(10) || !body[..10].is_ascii() {
        return None;
    }
    if &body[9..10] != ":" {
        return None;
    }
    let addressee = parse_callsign(body[..9].trim_end()).ok()?;
    let content = &body[10..];

    if let Some(id_text) = content.strip_prefix("ack") {
        if let Ok(id) = id_text.parse::<u16>() {
            return Some(Payload::Ack { addressee, id });
        }
    }

    let (text_part, id) = match content.rfind('{') {
        Some(brace) => match content[brace + 1..].parse::<u16>() {
            Ok(id) => (&content[..brace], Some(id)),
            Err(_) => (content, None),
        },
        None => (content, None),
    };
    let mut text = heapless::String::new();
    push_limited(&mut text, text_part);
    Some(Payload::Message {
        addressee,
        text,
        id,
    })
}

fn decode_telemetry(body: &str) -> Option<Payload> {
    // SSS,battery,temp,pressure,humidity
    let (sequence_text, rest) = body.split_once(',')?;
    let sequence: u16 = sequence_text.parse().ok()?;
    let mut fields = rest.split(',');
    let readings = SensorReadings {
        battery_v: fields.next()?.parse().ok()?,
        temperature_c: fields.next()?.parse().ok()?,
        pressure_hpa: fields.next()?.parse().ok()?,
        humidity_pct: fields.next()?.parse().ok()?,
    };
    Some(Payload::Telemetry { sequence, readings })
}

fn decode_payload(text: &str) -> Payload {
    let decoded = if let Some(body) = text.strip_prefix('!') {
        decode_position(body)
    } else if let Some(body) = text.strip_prefix('>') {
        let mut status = heapless::String::new();
        push_limited(&mut status, body);
        Some(Payload::Status(status))
    } else if let Some(body) = text.strip_prefix(':') {
        decode_directed(body)
    } else if let Some(body) = text.strip_prefix("T#") {
        decode_telemetry(body)
    } else {
        None
    };
    decoded.unwrap_or_else(|| {
        let mut other = heapless::String::new();
        push_limited(&mut other, text);
        Payload::Other(other)
    })
}

/// Decode one TNC2-style text frame into a logical packet.
pub fn decode_wire(frame: &str) -> Result<RxPacket, SimulatorError> {
    let (header, payload_text) = frame
        .split_once(':')
        .ok_or_else(|| SimulatorError::MalformedFrame(frame.to_string()))?;
    let (source_text, rest) = header
        .split_once('>')
        .ok_or_else(|| SimulatorError::MalformedFrame(frame.to_string()))?;
    let source = parse_callsign(source_text)?;

    let mut hops = rest.split(',');
    let destination = parse_callsign(
        hops.next()
            .ok_or_else(|| SimulatorError::MalformedFrame(frame.to_string()))?,
    )?;

    let mut packet = RxPacket::new(source, destination, decode_payload(payload_text));
    for hop in hops {
        let (call_text, used) = match hop.strip_suffix('*') {
            Some(call_text) => (call_text, true),
            None => (hop, false),
        };
        let call = parse_callsign(call_text)?;
        packet
            .path
            .push(PathHop { call, used })
            .map_err(|_| SimulatorError::FieldOutOfRange("path"))?;
    }
    Ok(packet)
}
