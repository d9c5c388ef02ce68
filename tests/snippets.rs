use pretty_assertions::assert_eq;
use std::sync::Arc;
use templayer::{Context, Engine, Error, Helpers, MemorySource, RenderEnv, Value};

/// Helpers for a site where only the user "kim" may edit, and user 42
/// has 7 followers.
struct SiteHelpers;

impl Helpers for SiteHelpers {
    fn check_access(&self, action: &str, target: &Value) -> bool {
        action == "user_update" && target.get("name").and_then(Value::as_str) == Some("kim")
    }

    fn display_name(&self, obj: &Value) -> String {
        obj.get("name").map(Value::text).unwrap_or_default()
    }

    fn translate(&self, key: &str) -> String {
        match key {
            "Followers" => "Seguidores".into(),
            other => other.into(),
        }
    }

    fn markdown(&self, text: &str) -> String {
        format!("<em>{text}</em>")
    }

    fn follow_count(&self, obj_type: &str, obj_id: &str) -> i64 {
        match (obj_type, obj_id) {
            ("user", "42") => 7,
            _ => 0,
        }
    }
}

fn engine() -> Engine {
    Engine::new(MemorySource::with_templates(
        "default",
        [
            (
                "page.html",
                "<body>@block primary {}</body>",
            ),
            (
                "user/read.html",
                "@extends(\"page.html\")\
                 @block primary {<h1>@h.display_name(user)</h1>\
                 @include(\"snippets/follow_button.html\", obj_type = \"user\", obj_id = user.id)}",
            ),
            (
                "snippets/follow_button.html",
                "<a data-type=\"@obj_type\" data-id=\"@obj_id\">\
                 @h.translate(\"Followers\"): @h.follow_count(obj_type, obj_id)</a>\
                 @if user {leaked}",
            ),
            ("snippets/peek.html", "@user.name"),
            (
                "snippets/whoami.html",
                "@if g.user {@g.user.name} else {anonymous}",
            ),
            ("snippets/loop.html", "[@include(\"snippets/loop.html\")]"),
            (
                "snippets/edit.html",
                "@if h.check_access(\"user_update\", user) {<a>edit</a>}",
            ),
        ],
    ))
}

fn user() -> Value {
    Value::map([("name", "kim"), ("id", "42")])
}

fn env() -> RenderEnv {
    RenderEnv::new().helpers(Arc::new(SiteHelpers))
}

#[test]
fn snippet_sees_only_its_parameters() {
    let e = engine();
    let ctx = Context::new().with("user", user());
    assert_eq!(
        e.render("user/read.html", &ctx, &env()).unwrap(),
        "<body><h1>kim</h1><a data-type=\"user\" data-id=\"42\">Seguidores: 7</a></body>"
    );
}

#[test]
fn render_snippet_directly() {
    let e = engine();
    let params = Context::new().with("obj_type", "user").with("obj_id", "42");
    assert_eq!(
        e.render_snippet("snippets/follow_button.html", &params, &env()).unwrap(),
        "<a data-type=\"user\" data-id=\"42\">Seguidores: 7</a>"
    );
}

#[test]
fn caller_variables_are_undefined_in_snippet() {
    let e = engine();
    let params = Context::new().with("obj_type", "user").with("obj_id", "42");
    assert!(matches!(
        e.render_snippet("snippets/peek.html", &params, &env()),
        Err(Error::UndefinedVariable { name, .. }) if name == "user.name"
    ));
}

#[test]
fn globals_reach_snippets() {
    let e = engine();
    let params = Context::new();
    assert_eq!(
        e.render_snippet("snippets/whoami.html", &params, &env()).unwrap(),
        "anonymous"
    );
    let env = env().global("user", user());
    assert_eq!(
        e.render_snippet("snippets/whoami.html", &params, &env).unwrap(),
        "kim"
    );
}

#[test]
fn helpers_decide_conditionals() {
    let e = engine();
    let params = Context::new().with("user", user());
    assert_eq!(
        e.render_snippet("snippets/edit.html", &params, &env()).unwrap(),
        "<a>edit</a>"
    );
    // The default helpers deny everything.
    assert_eq!(
        e.render_snippet("snippets/edit.html", &params, &RenderEnv::new()).unwrap(),
        ""
    );
}

#[test]
fn recursive_snippets_are_limited() {
    let e = engine().with_max_include_depth(3);
    match e.render_snippet("snippets/loop.html", &Context::new(), &env()) {
        Err(Error::IncludeDepth { path, max }) => {
            assert_eq!(path, "snippets/loop.html");
            assert_eq!(max, 3);
        }
        other => panic!("Expected depth error, got {other:?}"),
    }
}

#[test]
fn snippet_errors_propagate() {
    let e = Engine::new(MemorySource::with_templates(
        "default",
        [("page.html", "<p>@include(\"snippets/missing.html\")</p>")],
    ));
    assert!(matches!(
        e.render("page.html", &Context::new(), &RenderEnv::new()),
        Err(Error::TemplateNotFound { path, .. }) if path == "snippets/missing.html"
    ));
}

#[test]
fn snippets_follow_the_theme() {
    let e = engine().with_theme(
        "dark",
        MemorySource::with_templates(
            "dark",
            [(
                "snippets/follow_button.html",
                "<button>@obj_type/@obj_id</button>",
            )],
        ),
    )
    .unwrap();
    let ctx = Context::new().with("user", user());
    assert_eq!(
        e.render("user/read.html", &ctx, &env().theme("dark")).unwrap(),
        "<body><h1>kim</h1><button>user/42</button></body>"
    );
}

#[test]
fn snippet_can_extend() {
    let e = Engine::new(MemorySource::with_templates(
        "default",
        [
            ("page.html", "<main>@include(\"snippets/card.html\", title = t)</main>"),
            ("snippets/card_base.html", "<div>@block body {}</div>"),
            (
                "snippets/card.html",
                "@extends(\"snippets/card_base.html\")@block body {@title}",
            ),
        ],
    ));
    let ctx = Context::new().with("t", "Hello");
    assert_eq!(
        e.render("page.html", &ctx, &RenderEnv::new()).unwrap(),
        "<main><div>Hello</div></main>"
    );
}

#[test]
fn undefined_argument_is_passed_as_null() {
    let e = Engine::new(MemorySource::with_templates(
        "default",
        [
            ("page.html", "@include(\"snippets/about.html\", about = user.about)"),
            (
                "snippets/about.html",
                "@if about {@h.markdown(about)} else {Nothing here.}",
            ),
        ],
    ));
    let ctx = Context::new().with("user", Value::map([("name", "kim")]));
    assert_eq!(
        e.render("page.html", &ctx, &RenderEnv::new()).unwrap(),
        "Nothing here."
    );
    let ctx = Context::new().with("user", Value::map([("about", "Hi")]));
    assert_eq!(
        e.render("page.html", &ctx, &RenderEnv::new()).unwrap(),
        "<p>Hi</p>"
    );
}

#[test]
fn duplicate_parameter_is_an_error() {
    let e = Engine::new(MemorySource::with_templates(
        "default",
        [("page.html", "@include(\"s.html\", a = 1, a = 2)")],
    ));
    assert!(matches!(
        e.render("page.html", &Context::new(), &RenderEnv::new()),
        Err(Error::DuplicateParameter { parameter, .. }) if parameter == "a"
    ));
}
