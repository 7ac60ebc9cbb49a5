mod common;

use anyhow::{Context, Result};
use reqwest::header::{LOCATION, SET_COOKIE};
use reqwest::Response;
use serde_json::Value;

fn location(resp: &Response) -> Result<String> {
    let value = resp.headers().get(LOCATION).context("no Location header")?;
    Ok(value.to_str()?.to_string())
}

/// `name=value` pair from the response's Set-Cookie headers
fn cookie_pair(resp: &Response, name: &str) -> Option<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{}=", name)))
        .map(str::to_string)
}

/// Start a login and return (state cookie pair, state parameter)
async fn begin_login(server: &common::TestServer) -> Result<(String, String)> {
    let resp = common::client().get(server.url("/auth/provider")).send().await?;
    assert!(resp.status().is_redirection());

    let target = location(&resp)?;
    assert!(target.starts_with("http://idp.test/authorize"));
    let state = target
        .split_once("state=")
        .map(|(_, s)| s.to_string())
        .context("no state in authorize URL")?;

    let cookie = cookie_pair(&resp, "oauth_state").context("no state cookie")?;
    Ok((cookie, state))
}

#[tokio::test]
async fn successful_login_sets_session_and_redirects_to_front_end() -> Result<()> {
    let server = common::spawn_server(true).await?;
    let client = common::client();
    let (state_cookie, state) = begin_login(&server).await?;

    let resp = client
        .get(server.url(&format!(
            "/auth/provider/callback?code={}&state={}",
            common::GOOD_CODE,
            state
        )))
        .header("cookie", &state_cookie)
        .send()
        .await?;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp)?, common::SUCCESS_URL);

    let session_cookie = cookie_pair(&resp, "feedback.sid").context("no session cookie")?;
    assert_eq!(cookie_pair(&resp, "oauth_state").as_deref(), Some("oauth_state="));

    let user: Value = client
        .get(server.url("/auth/user"))
        .header("cookie", &session_cookie)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(user["authenticated"], true);
    assert_eq!(user["user"]["email"], "aashika@example.com");
    assert_eq!(user["user"]["name"], "Aashika");

    // The new session opens the write gate
    let resp = client
        .post(server.url("/api/improvements"))
        .header("cookie", &session_cookie)
        .json(&serde_json::json!({ "problem": "p", "solution": "s", "submittedBy": "b" }))
        .send()
        .await?;
    assert_eq!(resp.status(), 201);
    Ok(())
}

#[tokio::test]
async fn state_mismatch_redirects_to_login_without_session() -> Result<()> {
    let server = common::spawn_server(true).await?;
    let (state_cookie, _) = begin_login(&server).await?;

    let resp = common::client()
        .get(server.url(&format!(
            "/auth/provider/callback?code={}&state=forged",
            common::GOOD_CODE
        )))
        .header("cookie", &state_cookie)
        .send()
        .await?;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp)?, common::LOGIN_URL);
    assert!(cookie_pair(&resp, "feedback.sid").is_none());
    Ok(())
}

#[tokio::test]
async fn rejected_code_or_provider_error_redirects_to_login() -> Result<()> {
    let server = common::spawn_server(true).await?;
    let client = common::client();
    let (state_cookie, state) = begin_login(&server).await?;

    let resp = client
        .get(server.url(&format!("/auth/provider/callback?code=stolen&state={}", state)))
        .header("cookie", &state_cookie)
        .send()
        .await?;
    assert_eq!(location(&resp)?, common::LOGIN_URL);

    let resp = client
        .get(server.url("/auth/provider/callback?error=access_denied"))
        .send()
        .await?;
    assert_eq!(location(&resp)?, common::LOGIN_URL);
    assert!(cookie_pair(&resp, "feedback.sid").is_none());
    Ok(())
}

#[tokio::test]
async fn current_user_without_cookie_is_unauthenticated() -> Result<()> {
    let server = common::spawn_server(true).await?;

    let resp = common::client().get(server.url("/auth/user")).send().await?;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await?;
    assert_eq!(body["authenticated"], false);
    assert!(body.get("user").is_none());
    Ok(())
}

#[tokio::test]
async fn logout_destroys_session_and_clears_cookie() -> Result<()> {
    let server = common::spawn_server(true).await?;
    let client = common::client();
    let cookie = server.session_cookie().await?;

    let resp = client
        .post(server.url("/auth/logout"))
        .header("cookie", &cookie)
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    assert_eq!(cookie_pair(&resp, "feedback.sid").as_deref(), Some("feedback.sid="));
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Logged out successfully");

    let user: Value = client
        .get(server.url("/auth/user"))
        .header("cookie", &cookie)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(user["authenticated"], false);

    // Logging out twice is harmless
    let resp = client
        .post(server.url("/auth/logout"))
        .header("cookie", &cookie)
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    Ok(())
}
