use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::errors::DecodeError;
use crate::schema::{EndpointStats, Page, ResultStatus, SpoolStats};

// ------------------------------------------------------------
// Wire element names of the response envelope
// ------------------------------------------------------------
//
// Records sit at rpc/show/topic-endpoint/topic-endpoints/topic-endpoint.
// The list element is what distinguishes a record from the identically
// named command element above it.
//
const EL_RECORD_LIST: &str = "topic-endpoints";
const EL_RECORD: &str = "topic-endpoint";
const EL_NAME: &str = "name";
const EL_INFO: &str = "info";
const EL_VPN: &str = "message-vpn";
const EL_STATS: &str = "stats";
const EL_SPOOL_STATS: &str = "message-spool-stats";
const EL_CURSOR: &str = "more-cookie";
const EL_RESULT: &str = "execute-result";

const RESULT_OK: &str = "ok";

/// Decodes one page body into the typed page model.
///
/// CONTRACT:
/// - Deterministic: the same bytes decode to an identical `Page`.
/// - The continuation is the verbatim inner XML of the cursor element;
///   it is never reformatted or trimmed.
/// - Structural faults (bad XML, non-UTF-8, missing result element,
///   non-numeric counter text) fail the decode; a record missing
///   optional children decodes with empty-string/zero defaults.
///
pub fn decode(body: &[u8]) -> Result<Page, DecodeError> {
    let text = std::str::from_utf8(body)?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut continuation = String::new();
    let mut status: Option<ResultStatus> = None;

    // Element-name stack from the document root down to the element
    // currently being read.
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<EndpointStats> = None;
    let mut record_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = element_name(&start);

                if name == EL_CURSOR {
                    // The cursor's raw inner XML is the entire next
                    // request body; forward it byte-for-byte.
                    continuation = reader.read_text(start.name())?.into_owned();
                    continue;
                }

                if name == EL_RESULT {
                    status = Some(read_status(&start)?);
                }

                if name == EL_RECORD
                    && stack.last().map(String::as_str) == Some(EL_RECORD_LIST)
                {
                    current = Some(EndpointStats {
                        vpn_name: String::new(),
                        endpoint_name: String::new(),
                        spool: SpoolStats::default(),
                    });
                    record_depth = stack.len() + 1;
                }

                stack.push(name);
            }

            Event::Empty(start) => {
                if element_name(&start) == EL_RESULT {
                    status = Some(read_status(&start)?);
                }
            }

            Event::End(_) => {
                let closed = stack.pop();
                if let Some(record) = current.take() {
                    if stack.len() + 1 == record_depth
                        && closed.as_deref() == Some(EL_RECORD)
                    {
                        records.push(record);
                    } else {
                        current = Some(record);
                    }
                }
            }

            Event::Text(text) => {
                if let Some(record) = current.as_mut() {
                    let value = text.unescape()?;
                    assign_field(record, &stack, record_depth, value.as_ref())?;
                }
            }

            Event::Eof => break,

            _ => {}
        }
    }

    let status = status.ok_or(DecodeError::MissingElement(EL_RESULT))?;

    Ok(Page {
        records,
        continuation,
        status,
    })
}

fn element_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Reads the result status from the `code` attribute.
fn read_status(start: &BytesStart) -> Result<ResultStatus, DecodeError> {
    let code = match start.try_get_attribute("code")? {
        Some(attr) => attr.unescape_value()?.into_owned(),
        None => String::new(),
    };

    if code == RESULT_OK {
        Ok(ResultStatus::Ok)
    } else {
        Ok(ResultStatus::Failed(code))
    }
}

/// Routes a text node to its field within the record being built.
///
/// `stack` holds the full element path; everything below the record
/// element decides the field. Paths outside the known layout are
/// ignored, recognized counter elements must parse as numbers.
fn assign_field(
    record: &mut EndpointStats,
    stack: &[String],
    record_depth: usize,
    value: &str,
) -> Result<(), DecodeError> {
    let rel: Vec<&str> = stack
        .get(record_depth..)
        .unwrap_or_default()
        .iter()
        .map(String::as_str)
        .collect();

    match rel.as_slice() {
        [EL_NAME] => record.endpoint_name = value.to_owned(),
        [EL_INFO, EL_VPN] => record.vpn_name = value.to_owned(),
        [EL_STATS, EL_SPOOL_STATS, counter] => {
            if let Some(slot) = record.spool.counter_mut(counter) {
                *slot = value
                    .trim()
                    .parse()
                    .map_err(|_| DecodeError::InvalidCounter {
                        field: (*counter).to_owned(),
                        value: value.to_owned(),
                    })?;
            }
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOKIE: &str = "<rpc><show><topic-endpoint><name>*</name><vpn-name>*</vpn-name><stats/><count/><num-elements>100</num-elements><cursor>opaque-page-2</cursor></topic-endpoint></show></rpc>";

    fn record_xml(vpn: &str, name: &str, bytes: f64, redelivered: f64) -> String {
        format!(
            "<topic-endpoint><name>{name}</name><info><message-vpn>{vpn}</message-vpn></info>\
             <stats><message-spool-stats>\
             <total-bytes-spooled>{bytes}</total-bytes-spooled>\
             <messages-redelivered>{redelivered}</messages-redelivered>\
             </message-spool-stats></stats></topic-endpoint>"
        )
    }

    fn page_xml(records: &str, cookie: &str, code: &str) -> String {
        let cookie_el = if cookie.is_empty() {
            String::new()
        } else {
            format!("<more-cookie>{cookie}</more-cookie>")
        };
        format!(
            "<rpc-reply semp-version=\"soltr/9_12\"><rpc><show><topic-endpoint>\
             <topic-endpoints>{records}</topic-endpoints>\
             </topic-endpoint></show></rpc>{cookie_el}<execute-result code=\"{code}\"/></rpc-reply>"
        )
    }

    #[test]
    fn decodes_records_in_page_order() {
        let body = page_xml(
            &format!(
                "{}{}",
                record_xml("default", "orders", 1024.0, 3.0),
                record_xml("default", "invoices", 2048.0, 0.0)
            ),
            "",
            "ok",
        );

        let page = decode(body.as_bytes()).unwrap();
        assert!(page.status.is_ok());
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].endpoint_name, "orders");
        assert_eq!(page.records[0].vpn_name, "default");
        assert_eq!(page.records[0].spool.total_bytes_spooled, 1024.0);
        assert_eq!(page.records[0].spool.messages_redelivered, 3.0);
        assert_eq!(page.records[1].endpoint_name, "invoices");
        assert_eq!(page.records[1].spool.total_bytes_spooled, 2048.0);
    }

    #[test]
    fn cursor_inner_xml_is_verbatim() {
        let body = page_xml(&record_xml("default", "orders", 1.0, 0.0), COOKIE, "ok");

        let page = decode(body.as_bytes()).unwrap();
        assert_eq!(page.continuation, COOKIE);
    }

    #[test]
    fn missing_cursor_means_terminal_page() {
        let body = page_xml(&record_xml("default", "orders", 1.0, 0.0), "", "ok");

        let page = decode(body.as_bytes()).unwrap();
        assert_eq!(page.continuation, "");
    }

    #[test]
    fn non_ok_result_carries_the_code() {
        let body = page_xml("", "", "fail");

        let page = decode(body.as_bytes()).unwrap();
        assert_eq!(page.status, ResultStatus::Failed("fail".to_string()));
    }

    #[test]
    fn missing_result_element_fails_decode() {
        let body = "<rpc-reply><rpc><show/></rpc></rpc-reply>";

        let err = decode(body.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingElement(EL_RESULT)));
    }

    #[test]
    fn truncated_document_fails_decode() {
        let body = page_xml(&record_xml("default", "orders", 1.0, 0.0), "", "ok");
        let truncated = &body[..body.len() / 2];

        assert!(decode(truncated.as_bytes()).is_err());
    }

    #[test]
    fn non_numeric_counter_fails_decode() {
        let records = "<topic-endpoint><name>orders</name>\
             <stats><message-spool-stats>\
             <total-bytes-spooled>many</total-bytes-spooled>\
             </message-spool-stats></stats></topic-endpoint>";
        let body = page_xml(records, "", "ok");

        let err = decode(body.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidCounter { .. }));
    }

    #[test]
    fn unknown_counter_element_is_ignored() {
        let records = "<topic-endpoint><name>orders</name>\
             <stats><message-spool-stats>\
             <bind-count>not-a-number</bind-count>\
             <total-bytes-spooled>5</total-bytes-spooled>\
             </message-spool-stats></stats></topic-endpoint>";
        let body = page_xml(records, "", "ok");

        let page = decode(body.as_bytes()).unwrap();
        assert_eq!(page.records[0].spool.total_bytes_spooled, 5.0);
    }

    #[test]
    fn sparse_record_decodes_with_defaults() {
        let body = page_xml("<topic-endpoint><name>orders</name></topic-endpoint>", "", "ok");

        let page = decode(body.as_bytes()).unwrap();
        assert_eq!(page.records[0].endpoint_name, "orders");
        assert_eq!(page.records[0].vpn_name, "");
        assert_eq!(page.records[0].spool, SpoolStats::default());
    }

    #[test]
    fn decode_is_idempotent() {
        let body = page_xml(&record_xml("default", "orders", 1024.0, 3.0), COOKIE, "ok");

        let first = decode(body.as_bytes()).unwrap();
        let second = decode(body.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_record_list_is_a_valid_page() {
        let body = page_xml("", "", "ok");

        let page = decode(body.as_bytes()).unwrap();
        assert!(page.records.is_empty());
        assert!(page.status.is_ok());
    }
}
