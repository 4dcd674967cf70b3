//! Integration tests for MCP protocol handling.
//!
//! These tests verify the MCP server's JSON-RPC 2.0 protocol implementation,
//! including request/response handling, error responses, and lifecycle management.

use std::io::Cursor;
use std::sync::Arc;

use serde_json::{json, Value};

use kicad_pcb_mcp::flow::NextActionPolicy;
use kicad_pcb_mcp::mcp::protocol::{parse_message, IncomingMessage, RequestId};
use kicad_pcb_mcp::mcp::server::ServerState;
use kicad_pcb_mcp::mcp::{McpServer, ToolRegistry, Transport, MCP_PROTOCOL_VERSION};
use kicad_pcb_mcp::pcb::{MemoryBoard, MemoryEngine, RasterRenderer};
use kicad_pcb_mcp::tools::{register_all, Services};

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            }
        }
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "initialize");
        assert_eq!(req.id, RequestId::Number(1));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_tools_list_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/list",
        "params": {}
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "tools/list");
        assert_eq!(req.id, RequestId::Number(2));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_notification() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Notification(notif) = result.unwrap() {
        assert_eq!(notif.method, "notifications/initialized");
    } else {
        panic!("Expected Notification");
    }
}

#[test]
fn test_parse_invalid_json() {
    let json = "not valid json";

    let result = parse_message(json);
    assert!(result.is_err());
}

#[test]
fn test_parse_missing_jsonrpc_version() {
    let json = r#"{
        "id": 1,
        "method": "test"
    }"#;

    let result = parse_message(json);
    assert!(result.is_err());
}

// =============================================================================
// Session Tests
// =============================================================================

fn registry() -> ToolRegistry {
    let services = Services {
        cad: Arc::new(MemoryEngine::new(MemoryBoard::new("session"))),
        renderer: Arc::new(RasterRenderer::new(100, 100, 5).unwrap()),
        next_action: NextActionPolicy::Executed,
    };
    let mut registry = ToolRegistry::new();
    register_all(&services, &mut registry).unwrap();
    registry
}

/// Feeds `requests` to a fresh server and returns every line it wrote.
async fn run_session(requests: &[Value]) -> (ServerState, Vec<Value>) {
    let input: String = requests.iter().map(|r| format!("{r}\n")).collect();
    let transport = Transport::new(Cursor::new(input.into_bytes()), Vec::new());
    let mut server = McpServer::with_transport(registry(), transport);
    server.serve().await.unwrap();

    let state = server.state();
    let output = String::from_utf8(server.into_transport().into_writer()).unwrap();
    let lines = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (state, lines)
}

fn handshake() -> Vec<Value> {
    vec![
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": MCP_PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "1.0.0"}
            }
        }),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
    ]
}

#[tokio::test]
async fn test_session_lists_flow_tools() {
    let mut requests = handshake();
    requests.push(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}));

    let (state, responses) = run_session(&requests).await;
    assert_eq!(state, ServerState::ShuttingDown);
    assert_eq!(responses.len(), 2);

    assert_eq!(responses[0]["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "kicad-pcb-mcp");

    let tools = responses[1]["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    assert!(names.contains(&"create_item_step_1"));
    assert!(names.contains(&"get_board_status"));
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
}

#[tokio::test]
async fn test_session_runs_a_flow_step() {
    let mut requests = handshake();
    requests.push(json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/call",
        "params": {"name": "create_item_step_1", "arguments": {}}
    }));

    let (_, responses) = run_session(&requests).await;
    let result = &responses[1]["result"];
    assert_eq!(result["isError"], Value::Null);

    let text = result["content"][0]["text"].as_str().unwrap();
    let envelope: Value = serde_json::from_str(text).unwrap();
    assert_eq!(envelope["status"], "success");
    assert_eq!(envelope["next_action"], "create_item_step_2");
}

#[tokio::test]
async fn test_session_sends_progress_before_image() {
    let mut requests = handshake();
    requests.push(json!({
        "jsonrpc": "2.0",
        "id": 3,
        "method": "tools/call",
        "params": {
            "name": "create_item_step_3",
            "arguments": {
                "item_type": "Via",
                "args": {"position": {"x_nm": 0, "y_nm": 0}}
            }
        }
    }));
    requests.push(json!({
        "jsonrpc": "2.0",
        "id": 4,
        "method": "tools/call",
        "params": {
            "name": "verify_pcb_step_1",
            "arguments": {},
            "_meta": {"progressToken": 42}
        }
    }));

    let (_, responses) = run_session(&requests).await;
    // init, create, 2 progress notifications, verify
    assert_eq!(responses.len(), 5);

    assert_eq!(responses[2]["method"], "notifications/progress");
    assert_eq!(responses[2]["params"]["progressToken"], 42);
    assert_eq!(responses[3]["method"], "notifications/progress");

    let verify = &responses[4];
    assert_eq!(verify["id"], 4);
    let content = verify["result"]["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[1]["type"], "image");
    assert_eq!(content[1]["mimeType"], "image/png");
}

#[tokio::test]
async fn test_session_unknown_tool_is_error_result() {
    let mut requests = handshake();
    requests.push(json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/call",
        "params": {"name": "route_board", "arguments": {}}
    }));

    let (_, responses) = run_session(&requests).await;
    let result = &responses[1]["result"];
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Unknown tool: route_board"));
}

#[tokio::test]
async fn test_session_rejects_calls_before_initialised() {
    let requests = vec![json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {"name": "create_item_step_1", "arguments": {}}
    })];

    let (_, responses) = run_session(&requests).await;
    assert_eq!(responses.len(), 1);
    assert!(responses[0]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("not initialised"));
}
