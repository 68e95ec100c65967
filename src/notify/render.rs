// src/notify/render.rs

//! Pure renderers for the state table.

use std::fmt::Write;

use crate::models::{FlightState, SearchDefinition};
use crate::pipeline::SearchStates;
use crate::utils::format::{format_cents, format_clock, format_datetime, format_day, format_fare};

fn cheapest_cents(state: &FlightState) -> Option<u32> {
    state.snapshot.cheapest_available_fare().map(|fare| fare.cents)
}

/// Plain-text listing: one header per search, one line per flight.
pub fn render_text(states: &SearchStates) -> String {
    let mut out = String::new();
    for (search, flights) in states.searches() {
        let _ = writeln!(out, "{search}");
        for state in flights.values() {
            let snapshot = &state.snapshot;
            let _ = writeln!(
                out,
                "  ({}) {} {} -> {} {}: {}",
                state.change.symbol(),
                snapshot.origin_airport,
                format_datetime(&snapshot.departure_local_time),
                snapshot.destination_airport,
                format_datetime(&snapshot.arrival_local_time),
                format_fare(cheapest_cents(state)),
            );
        }
    }
    out
}

/// HTML report: one table per search.
pub fn render_html(states: &SearchStates) -> String {
    let mut out = String::new();
    out.push_str("<html>\n  <head><meta charset=\"UTF-8\"></head>\n");
    out.push_str("  <body style=\"font-family: Arial, Helvetica, sans-serif\">\n");
    for (search, flights) in states.searches() {
        render_search_header(&mut out, search);
        out.push_str("      <table style=\"border-collapse: collapse\">\n");
        out.push_str(
            "        <thead><tr><th colspan=\"2\">From</th><th colspan=\"2\">To</th>\
             <th>Stops</th><th>Price</th><th>Change</th></tr></thead>\n",
        );
        out.push_str("        <tbody>\n");
        for state in flights.values() {
            render_flight_row(&mut out, state);
        }
        out.push_str("        </tbody>\n      </table>\n    </div>\n");
    }
    out.push_str("  </body>\n</html>\n");
    out
}

fn render_search_header(out: &mut String, search: &SearchDefinition) {
    let _ = writeln!(out, "    <div>");
    let _ = writeln!(
        out,
        "      <h3 style=\"margin-bottom: 3px;\">{}</h3>",
        escape_html(&format_day(&search.min_departure_time))
    );
    if let Some(cents) = search.max_fare_cents {
        let _ = writeln!(out, "      <p>Max fare: {}</p>", escape_html(&format_cents(cents)));
    }
    if let Some(note) = &search.note {
        let _ = writeln!(out, "      <p>{}</p>", escape_html(note));
    }
}

fn render_flight_row(out: &mut String, state: &FlightState) {
    let snapshot = &state.snapshot;
    let cells = [
        snapshot.origin_airport.clone(),
        format_clock(&snapshot.departure_local_time),
        snapshot.destination_airport.clone(),
        format_clock(&snapshot.arrival_local_time),
        snapshot.stop_count().to_string(),
        format_fare(cheapest_cents(state)),
        state.change.label().to_string(),
    ];

    out.push_str("          <tr>");
    for cell in &cells {
        let _ = write!(out, "<td style=\"padding: 0px 15px 0px 0px\">{}</td>", escape_html(cell));
    }
    out.push_str("</tr>\n");
}

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
