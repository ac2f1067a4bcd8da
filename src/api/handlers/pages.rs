//! Page routes reached only after the access gate allowed the request.

use crate::forms::{AuthFlow, MIN_CODE_LENGTH, MIN_PASSWORD_LENGTH};
use axum::{
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
pub struct SignInQuery {
    redirect: Option<String>,
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
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

// Posts forms as JSON, reveals the confirm step and follows `navigate_to`.
const FORM_SCRIPT: &str = r#"<script>
const status = document.getElementById("status");
document.querySelectorAll("form[method=post]").forEach((form) => {
  form.addEventListener("submit", async (event) => {
    event.preventDefault();
    if (status) status.textContent = "";
    const payload = Object.fromEntries(new FormData(form));
    const response = await fetch(form.action, {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify(payload),
    });
    const body = await response.json().catch(() => ({}));
    if (status) status.textContent = body.error || body.message || "";
    if (body.step === "confirm") {
      document.getElementById("confirm-email").value = payload.email || "";
      document.getElementById("signup").hidden = true;
      document.getElementById("confirm").hidden = false;
    }
    if (body.navigate_to) window.location.assign(body.navigate_to);
  });
});
document.getElementById("back")?.addEventListener("click", () => {
  document.getElementById("confirm").hidden = true;
  document.getElementById("signup").hidden = false;
});
document.querySelectorAll("input[data-reveal]").forEach((toggle) => {
  toggle.addEventListener("change", () => {
    document.getElementById(toggle.dataset.reveal).type = toggle.checked ? "text" : "password";
  });
});
</script>"#;

pub async fn home() -> impl IntoResponse {
    Html(format!(
        r#"<!doctype html>
<html>
<head><title>Home</title></head>
<body>
<h1>Home</h1>
<p id="status" role="alert"></p>
<form method="post" action="/api/auth/sign-out"><button type="submit">Sign out</button></form>
{FORM_SCRIPT}
</body>
</html>"#
    ))
}

/// Authentication entry page: sign up, confirm and sign in forms.
pub async fn sign_in(Query(query): Query<SignInQuery>) -> impl IntoResponse {
    let flow = AuthFlow::new(query.redirect.as_deref());
    let redirect = escape(flow.redirect_url());

    Html(format!(
        r#"<!doctype html>
<html>
<head><title>Sign in</title></head>
<body>
<p id="status" role="alert"></p>
<section id="signup">
<h2>Sign up</h2>
<form method="post" action="/api/auth/sign-up">
<input type="email" name="email" required>
<input type="password" id="signup-password" name="password" minlength="{MIN_PASSWORD_LENGTH}" required>
<label><input type="checkbox" data-reveal="signup-password"> Show password</label>
<input type="password" id="signup-confirm-password" name="confirm_password" minlength="{MIN_PASSWORD_LENGTH}" required>
<label><input type="checkbox" data-reveal="signup-confirm-password"> Show password</label>
<input type="hidden" name="redirect" value="{redirect}">
<button type="submit">Sign up</button>
</form>
</section>
<section id="confirm" hidden>
<h2>Confirm sign up</h2>
<form method="post" action="/api/auth/confirm-sign-up">
<input type="hidden" id="confirm-email" name="email">
<input type="text" name="code" minlength="{MIN_CODE_LENGTH}" required>
<input type="hidden" name="redirect" value="{redirect}">
<button type="submit">Confirm</button>
</form>
<button type="button" id="back">Back to sign up</button>
</section>
<section id="signin">
<h2>Sign in</h2>
<form method="post" action="/api/auth/sign-in">
<input type="email" name="email" required>
<input type="password" id="signin-password" name="password" minlength="{MIN_PASSWORD_LENGTH}" required>
<label><input type="checkbox" data-reveal="signin-password"> Show password</label>
<button type="submit">Sign in</button>
</form>
</section>
{FORM_SCRIPT}
</body>
</html>"#
    ))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
