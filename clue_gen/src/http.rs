use tokio::{
  io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
  net::TcpStream,
};
use util::error::{XWordError, XWordResult};

/// Largest response body accepted from the relay.
pub const MAX_BODY: usize = 1 << 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
  pub status: u16,
  pub body: String,
}

impl HttpResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

fn protocol_error(msg: impl Into<String>) -> Box<dyn std::error::Error + Send + Sync> {
  XWordError::Clue(msg.into()).into()
}

fn check_body_len(len: usize) -> XWordResult<usize> {
  if len > MAX_BODY {
    return Err(protocol_error(format!("Response body of {len} bytes exceeds {MAX_BODY}")));
  }
  Ok(len)
}

pub async fn write_json_post(
  stream: &mut (impl AsyncWriteExt + Unpin),
  host: &str,
  path: &str,
  body: &str,
) -> XWordResult {
  let head = format!(
    "POST {path} HTTP/1.1\r\n\
     Host: {host}\r\n\
     Content-Type: application/json\r\n\
     Content-Length: {}\r\n\
     Connection: close\r\n\r\n",
    body.len()
  );
  stream.write_all(head.as_bytes()).await?;
  stream.write_all(body.as_bytes()).await?;
  stream.flush().await?;
  Ok(())
}

async fn read_crlf_line(stream: &mut (impl AsyncBufRead + Unpin)) -> XWordResult<String> {
  let mut line = String::new();
  if stream.read_line(&mut line).await? == 0 {
    return Err(protocol_error("Connection closed mid-response"));
  }
  Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

async fn read_chunked(stream: &mut (impl AsyncBufRead + Unpin)) -> XWordResult<Vec<u8>> {
  let mut body = vec![];
  loop {
    let size_line = read_crlf_line(stream).await?;
    let size_str = size_line.split(';').next().unwrap_or_default().trim();
    let size = usize::from_str_radix(size_str, 16)
      .map_err(|_| protocol_error(format!("Bad chunk size \"{size_line}\"")))?;
    if size == 0 {
      while !read_crlf_line(stream).await?.is_empty() {}
      return Ok(body);
    }

    let start = body.len();
    let end = start
      .checked_add(size)
      .ok_or_else(|| protocol_error(format!("Chunk size {size} overflows")))?;
    body.resize(check_body_len(end)?, 0);
    stream.read_exact(&mut body[start..]).await?;
    read_crlf_line(stream).await?;
  }
}

/// Reads one response. The body is delimited by `Content-Length`, chunked
/// encoding, or the end of the stream, and may not exceed `MAX_BODY` bytes.
pub async fn read_response(stream: &mut (impl AsyncBufRead + Unpin)) -> XWordResult<HttpResponse> {
  let status_line = read_crlf_line(stream).await?;
  let status = status_line
    .split_whitespace()
    .nth(1)
    .and_then(|code| code.parse::<u16>().ok())
    .ok_or_else(|| protocol_error(format!("Bad status line \"{status_line}\"")))?;

  let mut content_length = None;
  let mut chunked = false;
  loop {
    let line = read_crlf_line(stream).await?;
    if line.is_empty() {
      break;
    }
    let Some((name, value)) = line.split_once(':') else {
      continue;
    };
    let value = value.trim();
    if name.eq_ignore_ascii_case("content-length") {
      content_length = Some(
        value
          .parse::<usize>()
          .map_err(|_| protocol_error(format!("Bad Content-Length \"{value}\"")))?,
      );
    } else if name.eq_ignore_ascii_case("transfer-encoding") {
      chunked = value.to_ascii_lowercase().contains("chunked");
    }
  }

  let body = if chunked {
    read_chunked(stream).await?
  } else if let Some(len) = content_length {
    let mut body = vec![0u8; check_body_len(len)?];
    stream.read_exact(&mut body).await?;
    body
  } else {
    let mut body = vec![];
    (&mut *stream)
      .take(MAX_BODY as u64 + 1)
      .read_to_end(&mut body)
      .await?;
    check_body_len(body.len())?;
    body
  };

  Ok(HttpResponse {
    status,
    body: String::from_utf8(body).map_err(|_| protocol_error("Response body is not UTF-8"))?,
  })
}

/// Sends `body` as a JSON `POST` on a fresh connection.
pub async fn post_json(host: &str, port: u16, path: &str, body: &str) -> XWordResult<HttpResponse> {
  let mut stream = TcpStream::connect((host, port)).await?;
  write_json_post(&mut stream, host, path, body).await?;
  read_response(&mut BufReader::new(stream)).await
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;
  use tokio::io::BufReader;

  use super::{read_response, write_json_post, HttpResponse, MAX_BODY};

  #[gtest]
  #[tokio::test]
  async fn test_content_length() {
    let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\ncontent-length: 7\r\n\r\n{\"a\":1}trailing";
    let response = read_response(&mut BufReader::new(&raw[..])).await.unwrap();
    expect_eq!(&response, &HttpResponse { status: 200, body: "{\"a\":1}".to_owned() });
    expect_true!(response.is_success());
  }

  #[gtest]
  #[tokio::test]
  async fn test_chunked() {
    let raw =
      b"HTTP/1.1 502 Bad Gateway\r\nTransfer-Encoding: chunked\r\n\r\n4;ext=1\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";
    let response = read_response(&mut BufReader::new(&raw[..])).await.unwrap();
    expect_eq!(response.status, 502);
    expect_eq!(response.body.as_str(), "Wikipedia");
    expect_false!(response.is_success());
  }

  #[gtest]
  #[tokio::test]
  async fn test_read_to_end() {
    let raw = b"HTTP/1.0 404 Not Found\r\n\r\nnope";
    let response = read_response(&mut BufReader::new(&raw[..])).await.unwrap();
    expect_eq!(response.status, 404);
    expect_eq!(response.body.as_str(), "nope");
  }

  #[gtest]
  #[tokio::test]
  async fn test_malformed() {
    expect_that!(
      read_response(&mut BufReader::new(&b"garbage\r\n\r\n"[..])).await,
      err(anything())
    );
    expect_that!(
      read_response(&mut BufReader::new(&b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nshort"[..])).await,
      err(anything())
    );
  }

  #[gtest]
  #[tokio::test]
  async fn test_oversized_content_length() {
    let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 18446744073709551615\r\n\r\n{}";
    expect_that!(read_response(&mut BufReader::new(&raw[..])).await, err(anything()));

    let raw = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{{}}", MAX_BODY + 1);
    let err = read_response(&mut BufReader::new(raw.as_bytes())).await.unwrap_err();
    expect_that!(err.to_string(), contains_substring("exceeds"));
  }

  #[gtest]
  #[tokio::test]
  async fn test_oversized_chunk() {
    let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nffffffffffffffff\r\nabc\r\n0\r\n\r\n";
    expect_that!(read_response(&mut BufReader::new(&raw[..])).await, err(anything()));

    let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nab\r\nffffffffffffffff\r\nabc\r\n0\r\n\r\n";
    expect_that!(read_response(&mut BufReader::new(&raw[..])).await, err(anything()));
  }

  #[gtest]
  #[tokio::test]
  async fn test_unbounded_body_is_capped() {
    let mut raw = b"HTTP/1.1 200 OK\r\n\r\n".to_vec();
    raw.resize(raw.len() + MAX_BODY + 10, b'x');
    expect_that!(read_response(&mut BufReader::new(&raw[..])).await, err(anything()));
  }

  #[gtest]
  #[tokio::test]
  async fn test_write_request() {
    let mut out = vec![];
    write_json_post(&mut out, "127.0.0.1", "/api/chat", "{}")
      .await
      .unwrap();
    let text = String::from_utf8(out).unwrap();
    expect_that!(text.as_str(), starts_with("POST /api/chat HTTP/1.1\r\n"));
    expect_that!(text.as_str(), contains_substring("Content-Length: 2\r\n"));
    expect_that!(text.as_str(), ends_with("\r\n\r\n{}"));
  }
}
