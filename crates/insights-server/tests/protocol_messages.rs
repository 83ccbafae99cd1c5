//! Integration tests for protocol message serialization.
//!
//! Tests all client and server message types for correct JSON serialization.

use insights::{RenderOptions, render_dashboard};
use insights_core::{ControlId, ControlValue, DashboardContext, Dataset, RecordTable};
use insights_server::protocol::*;

#[test]
fn test_all_client_messages_serialize() {
    let messages = vec![
        ClientMessage::GetState,
        ClientMessage::ControlUpdate {
            control_id: ControlId::Regions,
            value: ControlValue::Selection(vec!["West".to_string()]),
        },
        ClientMessage::ControlUpdate {
            control_id: ControlId::StartDate,
            value: ControlValue::Date(chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()),
        },
        ClientMessage::Upload {
            file_name: "sales.csv".to_string(),
            data_base64: "T3JkZXIgRGF0ZQ==".to_string(),
        },
        ClientMessage::ResetFilters,
        ClientMessage::Export,
    ];

    // Serialize and deserialize each message
    for msg in messages {
        let json = serde_json::to_string(&msg).expect("Failed to serialize");
        let parsed: ClientMessage = serde_json::from_str(&json).expect("Failed to deserialize");

        // Check that the type field matches
        let msg_type = match &msg {
            ClientMessage::GetState => "get_state",
            ClientMessage::ControlUpdate { .. } => "control_update",
            ClientMessage::Upload { .. } => "upload",
            ClientMessage::ResetFilters => "reset_filters",
            ClientMessage::Export => "export",
        };

        assert!(
            json.contains(&format!("\"type\":\"{msg_type}\"")),
            "Message type '{}' not found in JSON: {}",
            msg_type,
            json
        );

        // Verify roundtrip
        assert_eq!(
            std::mem::discriminant(&msg),
            std::mem::discriminant(&parsed),
            "Message variant mismatch for {}",
            msg_type
        );
    }
}

#[test]
fn test_client_messages_from_browser_json() {
    let msg: ClientMessage =
        serde_json::from_str(r#"{"type":"control_update","control_id":"end_date","value":"2023-06-30"}"#).unwrap();
    match msg {
        ClientMessage::ControlUpdate { control_id, value } => {
            assert_eq!(control_id, ControlId::EndDate);
            assert_eq!(value.as_date(), chrono::NaiveDate::from_ymd_opt(2023, 6, 30));
        }
        other => panic!("unexpected {other:?}"),
    }

    let msg: ClientMessage =
        serde_json::from_str(r#"{"type":"control_update","control_id":"cities","value":[]}"#).unwrap();
    assert!(matches!(
        msg,
        ClientMessage::ControlUpdate {
            control_id: ControlId::Cities,
            value: ControlValue::Selection(ref v),
        } if v.is_empty()
    ));

    assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"execute_all"}"#).is_err());
}

#[test]
fn test_all_server_messages_serialize() {
    let ctx = DashboardContext::new(Dataset::from_table(RecordTable::from_records(vec![])));
    let view = render_dashboard(&ctx, &RenderOptions::default());

    let messages = vec![
        ServerMessage::Dashboard { view: Box::new(view) },
        ServerMessage::ExportReady {
            file_name: "Filtered_Data.csv".to_string(),
            mime_type: "text/csv".to_string(),
            data_base64: String::new(),
        },
        ServerMessage::LoadError {
            message: "unsupported file format: notes.txt".to_string(),
        },
        ServerMessage::Error {
            message: "Test error".to_string(),
        },
    ];

    for msg in messages {
        let value = serde_json::to_value(&msg).expect("Failed to serialize");
        let msg_type = match &msg {
            ServerMessage::Dashboard { .. } => "dashboard",
            ServerMessage::ExportReady { .. } => "export_ready",
            ServerMessage::LoadError { .. } => "load_error",
            ServerMessage::Error { .. } => "error",
        };
        assert_eq!(value["type"], msg_type);
    }
}

#[test]
fn test_dashboard_message_shape() {
    let ctx = DashboardContext::new(Dataset::from_table(RecordTable::from_records(vec![])));
    let msg = ServerMessage::Dashboard {
        view: Box::new(render_dashboard(&ctx, &RenderOptions::default())),
    };
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value["view"]["title"], "Market Insights Dashboard");
    assert_eq!(value["view"]["row_count"], 0);
    assert_eq!(value["view"]["controls"][0]["type"], "file_upload");
    assert_eq!(value["view"]["panels"].as_array().unwrap().len(), 9);
    // terminal text is not sent over the wire
    assert!(value["view"]["panels"][0].get("text").is_none());
}
