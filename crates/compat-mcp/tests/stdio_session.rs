use compat_config::AppConfig;
use compat_mcp::{McpServer, StdioTransport};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Drive a full session over an in-memory pipe and return every response.
async fn run_session(config: &AppConfig, requests: &[Value]) -> Vec<Value> {
    let server = McpServer::new(config).unwrap();

    let (client, server_side) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_side);
    let (client_read, mut client_write) = tokio::io::split(client);
    let mut transport = StdioTransport::new(server_read, server_write);

    let mut input = String::new();
    for request in requests {
        input.push_str(&request.to_string());
        input.push('\n');
    }

    let serve = async {
        server.run(&mut transport).await.unwrap();
    };

    let drive = async move {
        client_write.write_all(input.as_bytes()).await.unwrap();
        client_write.shutdown().await.unwrap();

        let mut responses = Vec::new();
        let mut lines = BufReader::new(client_read).lines();
        while let Some(line) = lines.next_line().await.unwrap() {
            responses.push(serde_json::from_str::<Value>(&line).unwrap());
        }
        responses
    };

    let ((), responses) = tokio::join!(serve, drive);
    responses
}

fn request(id: u64, method: &str, params: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params})
}

#[tokio::test]
async fn full_session_over_stdio() {
    let requests = vec![
        request(
            1,
            "initialize",
            json!({"protocolVersion": "2024-11-05", "capabilities": {}, "clientInfo": {"name": "test", "version": "1"}}),
        ),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        request(2, "tools/list", json!({})),
        request(
            3,
            "tools/call",
            json!({"name": "check-typescript-eslint-compat", "arguments": {"typescriptVersion": "5.9.2", "eslintPluginVersion": "6.5.0"}}),
        ),
        request(4, "resources/read", json!({"uri": "ts-eslint-compat://5.9.2"})),
    ];

    let responses = run_session(&AppConfig::default(), &requests).await;

    // the notification gets no reply
    assert_eq!(responses.len(), 4);
    let ids: Vec<u64> = responses.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "ts-eslint-compat");
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 1);

    let tool_text = responses[2]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(tool_text.contains("Your @typescript-eslint version is too old"));

    let resource_text = responses[3]["result"]["contents"][0]["text"].as_str().unwrap();
    assert!(resource_text.starts_with("TypeScript version: 5.9.2\n\n"));
}

#[tokio::test]
async fn resource_and_tool_share_recommendation_text() {
    for version in ["5.2.0", "5.9.2", "6.1.0", "v5", "not-a-version"] {
        let requests = vec![
            request(
                1,
                "tools/call",
                json!({"name": "check-typescript-eslint-compat", "arguments": {"typescriptVersion": version}}),
            ),
            request(2, "resources/read", json!({"uri": format!("ts-eslint-compat://{version}")})),
        ];
        let responses = run_session(&AppConfig::default(), &requests).await;

        let tool_text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
        let resource_text = responses[1]["result"]["contents"][0]["text"].as_str().unwrap();

        let embedded = resource_text
            .split("\n\n")
            .nth(1)
            .unwrap();
        assert_eq!(embedded, tool_text, "{version}");
        assert!(!tool_text.contains("officially supports"));
    }
}

#[tokio::test]
async fn configured_names_flow_through() {
    let config = AppConfig::from_yaml_str(
        r#"
server:
  name: custom-compat
resource:
  scheme: tscompat
tool:
  name: compat
"#,
    )
    .unwrap();

    let requests = vec![
        request(1, "initialize", json!({})),
        request(2, "tools/call", json!({"name": "compat", "arguments": {"typescriptVersion": "5.3.0"}})),
        request(3, "resources/read", json!({"uri": "tscompat://5.3.0"})),
        request(4, "resources/read", json!({"uri": "ts-eslint-compat://5.3.0"})),
    ];
    let responses = run_session(&config, &requests).await;

    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "custom-compat");
    assert!(responses[1]["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("No action required"));
    assert!(responses[2]["result"].is_object());
    assert_eq!(responses[3]["error"]["code"], -32602);
}

#[tokio::test]
async fn garbage_lines_do_not_end_the_session() {
    let server = McpServer::new(&AppConfig::default()).unwrap();
    let input = b"garbage\n{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"ping\"}\n".to_vec();
    let mut output = Vec::new();
    {
        let mut transport = StdioTransport::new(input.as_slice(), &mut output);
        server.run(&mut transport).await.unwrap();
    }

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["error"]["code"], -32700);
    assert_eq!(lines[1]["id"], 9);
    assert_eq!(lines[1]["result"], json!({}));
}

#[tokio::test]
async fn shutdown_future_stops_the_loop() {
    let server = McpServer::new(&AppConfig::default()).unwrap();
    // never-ending input: the shutdown future is the only way out
    let (_client, server_side) = tokio::io::duplex(1024);
    let (server_read, server_write) = tokio::io::split(server_side);
    let mut transport = StdioTransport::new(server_read, server_write);

    server
        .run_until(&mut transport, async {})
        .await
        .unwrap();
    assert_eq!(server.engine().policy().plugin_name, "@typescript-eslint");
}
