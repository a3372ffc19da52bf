// routes/home.rs
// GET / -> simple HTML page with login and registration forms that post JSON.

use axum::response::Html;

pub async fn home() -> Html<&'static str> {
    Html(r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>FinFusion</title>
</head>
<body>
  <main>
    <h1>FinFusion</h1>
    <form id="login-form" data-endpoint="/login">
      <h2>Login</h2>
      <label>
        Username
        <input name="username" autocomplete="username" required>
      </label>
      <label>
        Password
        <input name="password" type="password" autocomplete="current-password" required>
      </label>
      <button type="submit">Sign in</button>
    </form>
    <form id="register-form" data-endpoint="/register">
      <h2>Register</h2>
      <label>
        Username
        <input name="username" autocomplete="username" required>
      </label>
      <label>
        Password
        <input name="password" type="password" autocomplete="new-password" required>
      </label>
      <button type="submit">Create account</button>
    </form>
    <pre id="result"></pre>
  </main>
  <script>
    const result = document.getElementById('result');

    for (const form of document.querySelectorAll('form')) {
      form.addEventListener('submit', async (event) => {
        event.preventDefault();
        const body = {
          username: form.username.value.trim(),
          password: form.password.value
        };

        try {
          const response = await fetch(form.dataset.endpoint, {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify(body)
          });
          result.textContent = await response.text();
        } catch (err) {
          result.textContent = 'Request failed';
        }
      });
    }
  </script>
</body>
</html>
"#)
}
