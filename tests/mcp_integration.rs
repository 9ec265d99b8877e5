//! MCP server integration tests.
//!
//! These tests spawn `latex-mcp mcp` as a subprocess and communicate via
//! JSON-RPC 2.0 over stdin/stdout, verifying the handshake, tool listing,
//! tool invocation and error handling. The streamable HTTP transport gets a
//! handshake over a raw TCP connection.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use base64::Engine;

/// Get the path to the latex-mcp binary (must be built with the mcp feature).
fn latex_mcp_binary() -> PathBuf {
    let release = Path::new("target/release/latex-mcp");
    if release.exists() {
        return release.to_path_buf();
    }
    let debug = Path::new("target/debug/latex-mcp");
    if debug.exists() {
        return debug.to_path_buf();
    }
    panic!("latex-mcp binary not found. Run `cargo build` first.");
}

/// A lightweight MCP client that talks to a `latex-mcp mcp` subprocess.
struct McpClient {
    child: std::process::Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    next_id: u64,
}

impl McpClient {
    fn spawn() -> Self {
        let mut child = Command::new(latex_mcp_binary())
            .arg("mcp")
            .env_remove("MCP_TRANSPORT")
            .env_remove("LATEX_MCP_CONFIG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn latex-mcp mcp");

        let stdin = child.stdin.take().expect("no stdin");
        let stdout = child.stdout.take().expect("no stdout");
        let reader = BufReader::new(stdout);

        McpClient { child, stdin, reader, next_id: 1 }
    }

    /// Send a JSON-RPC request and return the parsed response.
    fn request(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        let id = self.next_id;
        self.next_id += 1;

        let msg = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let line = serde_json::to_string(&msg).unwrap();
        writeln!(self.stdin, "{}", line).expect("write to stdin failed");
        self.stdin.flush().expect("flush stdin failed");

        let mut buf = String::new();
        self.reader.read_line(&mut buf).expect("read from stdout failed");
        serde_json::from_str(&buf)
            .unwrap_or_else(|e| panic!("failed to parse response JSON: {}\nraw: {}", e, buf))
    }

    /// Send the initialize handshake and return the result.
    fn initialize(&mut self) -> serde_json::Value {
        let resp = self.request(
            "initialize",
            serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {
                    "name": "test-client",
                    "version": "0.1.0"
                }
            }),
        );

        let notif = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized",
        });
        let line = serde_json::to_string(&notif).unwrap();
        writeln!(self.stdin, "{}", line).expect("write notification failed");
        self.stdin.flush().expect("flush notification failed");

        std::thread::sleep(Duration::from_millis(50));

        resp
    }

    fn list_tools(&mut self) -> serde_json::Value {
        self.request("tools/list", serde_json::json!({}))
    }

    fn call_tool(&mut self, name: &str, args: serde_json::Value) -> serde_json::Value {
        self.request(
            "tools/call",
            serde_json::json!({
                "name": name,
                "arguments": args,
            }),
        )
    }

    /// Shut down by closing stdin, which causes the server to exit.
    fn shutdown(mut self) {
        drop(self.stdin);
        let _ = self.child.wait();
    }
}

/// Parse the first text block of a tool result as JSON.
fn first_text_json(result: &serde_json::Value) -> serde_json::Value {
    let content = result["content"].as_array().expect("content should be array");
    let text = content
        .iter()
        .find_map(|c| c["text"].as_str())
        .expect("result should contain a text block");
    serde_json::from_str(text).expect("text block should be JSON")
}

fn is_error(result: &serde_json::Value) -> bool {
    result.get("isError").and_then(|e| e.as_bool()).unwrap_or(false)
}

// ── Handshake ─────────────────────────────────────────────────────────

#[test]
fn test_mcp_initialize_handshake() {
    let mut client = McpClient::spawn();
    let resp = client.initialize();

    let result = resp.get("result").expect("initialize should return result");
    assert_eq!(result["protocolVersion"].as_str().unwrap(), "2024-11-05");

    let info = &result["serverInfo"];
    assert_eq!(info["name"].as_str().unwrap(), "latex-mcp");
    assert!(info["version"].as_str().is_some(), "version should be present");
    assert!(result["instructions"].as_str().unwrap().contains("render_latex"));

    let caps = &result["capabilities"];
    assert!(caps.get("tools").is_some(), "tools capability should be present");

    client.shutdown();
}

// ── Tool Listing ──────────────────────────────────────────────────────

#[test]
fn test_mcp_tools_list() {
    let mut client = McpClient::spawn();
    client.initialize();

    let resp = client.list_tools();
    let result = resp.get("result").expect("tools/list should return result");
    let tools = result["tools"].as_array().expect("tools should be an array");
    assert_eq!(tools.len(), 4, "expected 4 tools, got {}", tools.len());

    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    for name in ["render_latex", "render_solution", "check_latex_syntax", "latex_url"] {
        assert!(names.contains(&name), "missing tool: {}", name);
    }

    for tool in tools {
        let name = tool["name"].as_str().unwrap();
        assert!(
            tool.get("description").and_then(|d| d.as_str()).is_some(),
            "tool {} missing description",
            name
        );
        let schema =
            tool.get("inputSchema").unwrap_or_else(|| panic!("tool {} missing inputSchema", name));
        assert_eq!(schema["type"].as_str().unwrap(), "object");
    }

    let render = tools.iter().find(|t| t["name"] == "render_latex").unwrap();
    let required = render["inputSchema"]["required"].as_array().expect("render_latex has required fields");
    assert_eq!(required, &vec![serde_json::json!("latex")]);

    client.shutdown();
}

// ── Tool Calls ────────────────────────────────────────────────────────

#[test]
fn test_mcp_tool_render_latex() {
    let mut client = McpClient::spawn();
    client.initialize();

    let resp = client.call_tool("render_latex", serde_json::json!({ "latex": "$E = mc^2$" }));
    let result = resp.get("result").expect("tool call should return result");
    assert!(!is_error(result));

    let envelope = first_text_json(result);
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["width_hint"], "600px");
    assert!(envelope["size_kb"].as_f64().unwrap() > 0.0);

    let b64 = envelope["base64"].as_str().unwrap();
    let png = base64::engine::general_purpose::STANDARD.decode(b64).expect("valid base64");
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(envelope["data_uri"].as_str().unwrap(), format!("data:image/png;base64,{}", b64));

    client.shutdown();
}

#[test]
fn test_mcp_tool_render_latex_image_mode() {
    let mut client = McpClient::spawn();
    client.initialize();

    let resp = client.call_tool(
        "render_latex",
        serde_json::json!({ "latex": r"\frac{a}{b}", "theme": "dark", "output": "image" }),
    );
    let result = resp.get("result").expect("tool call should return result");
    let content = result["content"].as_array().expect("content should be array");
    assert_eq!(content[0]["type"], "image");
    assert_eq!(content[0]["mimeType"], "image/png");
    assert_eq!(content[1]["type"], "text");

    client.shutdown();
}

#[test]
fn test_mcp_tool_render_solution() {
    let mut client = McpClient::spawn();
    client.initialize();

    let resp = client.call_tool(
        "render_solution",
        serde_json::json!({
            "steps": [
                {"label": "Problem", "latex": "Solve: $x^2 - 5x + 6 = 0$"},
                {"label": "Factor", "latex": "(x-2)(x-3) = 0"},
                {"label": "Answer", "latex": "x = 2 \\text{ or } x = 3"}
            ]
        }),
    );
    let result = resp.get("result").expect("tool call should return result");
    assert!(!is_error(result));

    let envelope = first_text_json(result);
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["step_count"], 3);
    assert!(envelope["message"].as_str().unwrap().contains("3 steps"));

    client.shutdown();
}

#[test]
fn test_mcp_tool_check_latex_syntax() {
    let mut client = McpClient::spawn();
    client.initialize();

    let resp = client.call_tool("check_latex_syntax", serde_json::json!({ "latex": "$x^2" }));
    let result = resp.get("result").expect("tool call should return result");
    let report = first_text_json(result);
    assert_eq!(report["valid"], false);
    assert!(!report["errors"].as_array().unwrap().is_empty());
    assert_eq!(report["suggestion"], "$x^2$");

    let resp = client.call_tool("check_latex_syntax", serde_json::json!({ "latex": r"\alpha + \beta" }));
    let report = first_text_json(resp.get("result").unwrap());
    assert_eq!(report["valid"], true);

    client.shutdown();
}

#[test]
fn test_mcp_tool_latex_url() {
    let mut client = McpClient::spawn();
    client.initialize();

    let resp = client.call_tool("latex_url", serde_json::json!({ "latex": "x^2", "dpi": 200 }));
    let result = resp.get("result").expect("tool call should return result");
    assert!(!is_error(result));
    let envelope = first_text_json(result);
    let url = envelope["url"].as_str().unwrap();
    assert!(url.starts_with("https://latex.codecogs.com/png.image?"));
    assert!(url.contains("200"));

    client.shutdown();
}

// ── Error Cases ───────────────────────────────────────────────────────

#[test]
fn test_mcp_render_failure_is_error_result() {
    let mut client = McpClient::spawn();
    client.initialize();

    let resp = client.call_tool("render_latex", serde_json::json!({ "latex": r"\frac{1}" }));
    let result = resp.get("result").expect("tool failures are results, not protocol errors");
    assert!(is_error(result));

    let envelope = first_text_json(result);
    assert_eq!(envelope["success"], false);
    assert!(envelope["base64"].is_null());
    assert!(envelope["message"].as_str().unwrap().starts_with("Rendering failed:"));

    client.shutdown();
}

#[test]
fn test_mcp_render_out_of_range_dpi() {
    let mut client = McpClient::spawn();
    client.initialize();

    let resp = client.call_tool("render_latex", serde_json::json!({ "latex": "x", "dpi": 1000 }));
    let result = resp.get("result").expect("tool call should return result");
    assert!(is_error(result));
    let envelope = first_text_json(result);
    assert!(envelope["message"].as_str().unwrap().contains("dpi must be between 72 and 300"));

    client.shutdown();
}

#[test]
fn test_mcp_error_invalid_tool_name() {
    let mut client = McpClient::spawn();
    client.initialize();

    let resp = client.call_tool("nonexistent_tool", serde_json::json!({}));
    assert!(
        resp.get("error").is_some() || resp.get("result").map(is_error).unwrap_or(false),
        "unknown tool should produce an error: {}",
        resp
    );

    client.shutdown();
}

#[test]
fn test_mcp_error_missing_required_field() {
    let mut client = McpClient::spawn();
    client.initialize();

    let resp = client.call_tool("render_latex", serde_json::json!({ "theme": "dark" }));
    assert!(
        resp.get("error").is_some() || resp.get("result").map(is_error).unwrap_or(false),
        "missing latex should produce an error: {}",
        resp
    );

    // The server keeps serving after a bad call
    let resp = client.call_tool("render_latex", serde_json::json!({ "latex": "y" }));
    assert!(!is_error(resp.get("result").unwrap()));

    client.shutdown();
}

// ── Transports ────────────────────────────────────────────────────────

#[test]
fn test_mcp_rejects_sse_transport() {
    let output = Command::new(latex_mcp_binary())
        .arg("mcp")
        .env_remove("LATEX_MCP_CONFIG")
        .env("MCP_TRANSPORT", "sse")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run latex-mcp mcp");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("use 'streamable-http'"), "stderr: {}", stderr);
}

/// Kills the HTTP server when the test ends, pass or fail.
struct ServerGuard(std::process::Child);

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn connect(port: u16) -> TcpStream {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        match TcpStream::connect(("127.0.0.1", port)) {
            Ok(stream) => return stream,
            Err(e) if Instant::now() > deadline => panic!("server never listened on {}: {}", port, e),
            Err(_) => std::thread::sleep(Duration::from_millis(50)),
        }
    }
}

#[test]
fn test_mcp_streamable_http_initialize() {
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let _server = ServerGuard(
        Command::new(latex_mcp_binary())
            .arg("mcp")
            .env_remove("LATEX_MCP_CONFIG")
            .env("MCP_TRANSPORT", "streamable-http")
            .env("HOST", "127.0.0.1")
            .env("PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to spawn latex-mcp mcp"),
    );

    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "0.1.0" }
        }
    })
    .to_string();
    let request = format!(
        "POST /mcp HTTP/1.1\r\nHost: 127.0.0.1:{}\r\nContent-Type: application/json\r\n\
         Accept: application/json, text/event-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        port,
        body.len(),
        body
    );

    let mut stream = connect(port);
    stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    stream.write_all(request.as_bytes()).unwrap();

    // The initialize reply is a one-event SSE stream; read until it arrives
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];
    while !String::from_utf8_lossy(&raw).contains("serverInfo") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => raw.extend_from_slice(&chunk[..n]),
        }
    }

    let response = String::from_utf8_lossy(&raw);
    assert!(response.starts_with("HTTP/1.1 200"), "response: {}", response);
    assert!(response.to_ascii_lowercase().contains("mcp-session-id:"), "response: {}", response);
    assert!(response.contains("\"name\":\"latex-mcp\""), "response: {}", response);
}
