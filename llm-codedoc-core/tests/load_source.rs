use std::io::Write;

use llm_codedoc_core::contract::SourceLoader;
use llm_codedoc_core::error::LoadError;
use llm_codedoc_core::load::{rewrite_github_url, DefaultLoader, SourceInput, SourceText};
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_rewrite_github_blob_urls() {
    struct TestCase {
        input: &'static str,
        expected: &'static str,
    }

    let cases = vec![
        TestCase {
            input: "https://github.com/org/repo/blob/main/f.py",
            expected: "https://raw.githubusercontent.com/org/repo/main/f.py",
        },
        TestCase {
            input: "https://github.com/org/repo/blob/feature/x/src/lib.rs",
            expected: "https://raw.githubusercontent.com/org/repo/feature/x/src/lib.rs",
        },
        TestCase {
            input: "https://raw.githubusercontent.com/org/repo/main/f.py",
            expected: "https://raw.githubusercontent.com/org/repo/main/f.py",
        },
        TestCase {
            input: "https://example.com/blob/main/f.py",
            expected: "https://example.com/blob/main/f.py",
        },
        TestCase {
            input: "https://github.com/org/repo/tree/main/src",
            expected: "https://github.com/org/repo/tree/main/src",
        },
    ];

    for tc in cases {
        assert_eq!(rewrite_github_url(tc.input), tc.expected, "input: {}", tc.input);
    }
}

#[test]
fn test_from_location_distinguishes_urls_and_paths() {
    assert_eq!(
        SourceInput::from_location("https://example.com/a.py"),
        SourceInput::Url("https://example.com/a.py".into())
    );
    assert_eq!(
        SourceInput::from_location("http://example.com/a.py"),
        SourceInput::Url("http://example.com/a.py".into())
    );
    assert_eq!(
        SourceInput::from_location("src/httpd.py"),
        SourceInput::Path("src/httpd.py".into())
    );
}

#[test]
fn test_language_hint_from_origin() {
    assert_eq!(SourceText::new("", "app/main.py").language_hint(), Some("python"));
    assert_eq!(SourceText::new("", "lib.RS").language_hint(), Some("rust"));
    assert_eq!(
        SourceText::new("", "https://host/x/index.ts#L10").language_hint(),
        Some("typescript")
    );
    assert_eq!(SourceText::new("", "<text>").language_hint(), None);
    assert_eq!(SourceText::new("", "notes.unknownext").language_hint(), None);
}

#[tokio::test]
async fn test_load_local_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "def f():\n    return 42\n").unwrap();

    let loader = DefaultLoader::new();
    let loaded = loader
        .load(SourceInput::Path(file.path().to_path_buf()))
        .await
        .expect("file should load");

    assert_eq!(loaded.content, "def f():\n    return 42\n");
    assert_eq!(loaded.origin, file.path().display().to_string());
}

#[tokio::test]
async fn test_load_missing_file_is_not_found() {
    let loader = DefaultLoader::new();
    let err = loader
        .load(SourceInput::Path("/definitely/not/here.py".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::NotFound(_)));
    assert_eq!(err.to_string(), "File not found at path: /definitely/not/here.py");
}

#[tokio::test]
async fn test_load_url_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/code/app.py"))
        .respond_with(ResponseTemplate::new(200).set_body_string("print('remote')\n"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/code/app.py", server.uri());
    let loaded = DefaultLoader::new()
        .load(SourceInput::Url(url.clone()))
        .await
        .expect("URL should load");

    assert_eq!(loaded.content, "print('remote')\n");
    assert_eq!(loaded.origin, url);
    assert_eq!(loaded.language_hint(), Some("python"));
}

#[tokio::test]
async fn test_load_url_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = DefaultLoader::new()
        .load(SourceInput::Url(format!("{}/missing.py", server.uri())))
        .await
        .unwrap_err();

    match err {
        LoadError::Status { status, .. } => assert_eq!(status, 404),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_load_url_unreachable_is_http_error() {
    // Nothing listens on port 9 (discard) in the test environment.
    let err = DefaultLoader::new()
        .load(SourceInput::Url("http://127.0.0.1:9/f.py".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Http(_)));
    assert!(err.to_string().starts_with("Error fetching the file from URL"));
}

#[tokio::test]
async fn test_load_upload_decodes_utf8() {
    let loader = DefaultLoader::new();
    let loaded = loader
        .load(SourceInput::Upload {
            filename: "upload.go".into(),
            bytes: "package main // héllo\n".as_bytes().to_vec(),
        })
        .await
        .unwrap();

    assert_eq!(loaded.content, "package main // héllo\n");
    assert_eq!(loaded.language_hint(), Some("go"));
}

#[tokio::test]
async fn test_load_upload_rejects_invalid_utf8() {
    let err = DefaultLoader::new()
        .load(SourceInput::Upload {
            filename: "blob.bin".into(),
            bytes: vec![0x66, 0x6f, 0xff, 0xfe],
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::InvalidUtf8 { .. }));
}

#[tokio::test]
async fn test_load_empty_text_is_rejected() {
    let loader = DefaultLoader::new();
    let err = loader.load(SourceInput::Text(String::new())).await.unwrap_err();
    assert!(matches!(err, LoadError::Empty));

    let loaded = loader
        .load(SourceInput::Text("x = 1".into()))
        .await
        .unwrap();
    assert_eq!(loaded.origin, "<text>");
}

#[tokio::test]
async fn test_load_empty_file_is_rejected() {
    let file = NamedTempFile::new().unwrap();

    let err = DefaultLoader::new()
        .load(SourceInput::Path(file.path().to_path_buf()))
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Empty), "got {err:?}");
}

#[tokio::test]
async fn test_load_empty_url_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/code/empty.py"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let err = DefaultLoader::new()
        .load(SourceInput::Url(format!("{}/code/empty.py", server.uri())))
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Empty), "got {err:?}");
}

#[tokio::test]
async fn test_load_url_honours_client_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/code/slow.py"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("x = 1\n")
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_millis(200))
        .build()
        .unwrap();
    let err = DefaultLoader::with_client(client)
        .load(SourceInput::Url(format!("{}/code/slow.py", server.uri())))
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Http(_)), "got {err:?}");
}
