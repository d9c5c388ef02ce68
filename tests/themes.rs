use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use templayer::{Context, DirSource, Engine, Error, MemorySource, RenderEnv};

fn engine() -> Engine {
    Engine::new(MemorySource::with_templates(
        "default",
        [
            ("page.html", "<body>@block content {default}</body>"),
            ("user/read.html", "@extends(\"page.html\")@block content {user}"),
            ("group/read.html", "@extends(\"page.html\")@block content {group}"),
        ],
    ))
    .with_theme(
        "dark",
        MemorySource::with_templates(
            "dark",
            [("page.html", "<body class=\"dark\">@block content {dark}</body>")],
        ),
    )
    .unwrap()
    .with_theme(
        "compact",
        MemorySource::with_templates(
            "compact",
            [(
                "user/read.html",
                "@extends(\"page.html\")@block content {compact @super()}",
            )],
        ),
    )
    .unwrap()
}

fn render(engine: &Engine, path: &str, theme: Option<&str>) -> String {
    let env = RenderEnv::new().maybe_theme(theme.map(String::from));
    engine.render(path, &Context::new(), &env).unwrap()
}

#[test]
fn default_only() {
    let e = engine();
    assert_eq!(render(&e, "user/read.html", None), "<body>user</body>");
    let loaded = e.resolve("page.html", None).unwrap();
    assert_eq!(loaded.origin.to_string(), "default:page.html");
}

#[test]
fn theme_overrides_ancestor() {
    let e = engine();
    assert_eq!(
        render(&e, "user/read.html", Some("dark")),
        "<body class=\"dark\">user</body>"
    );
    assert_eq!(
        render(&e, "group/read.html", Some("dark")),
        "<body class=\"dark\">group</body>"
    );
}

#[test]
fn theme_overrides_leaf() {
    let e = engine();
    assert_eq!(
        render(&e, "user/read.html", Some("compact")),
        "<body>compact default</body>"
    );
    // Only the overridden page changes.
    assert_eq!(render(&e, "group/read.html", Some("compact")), "<body>group</body>");
}

#[test]
fn themes_do_not_leak_into_each_other() {
    let e = engine();
    let chain = e.build_chain("user/read.html", Some("dark")).unwrap();
    let origins: Vec<String> = chain.origins().iter().map(|o| o.to_string()).collect();
    assert_eq!(origins, ["default:user/read.html", "dark:page.html"]);

    let chain = e.build_chain("user/read.html", Some("compact")).unwrap();
    let origins: Vec<String> = chain.origins().iter().map(|o| o.to_string()).collect();
    assert_eq!(origins, ["compact:user/read.html", "default:page.html"]);

    // Rendering with a theme leaves unthemed renders alone.
    assert_eq!(render(&e, "user/read.html", None), "<body>user</body>");
}

#[test]
fn unknown_theme() {
    let e = engine();
    let env = RenderEnv::new().theme("neon");
    assert!(matches!(
        e.render("page.html", &Context::new(), &env),
        Err(Error::UnknownTheme(name)) if name == "neon"
    ));
}

#[test]
fn not_found_lists_searched_roots() {
    let e = engine();
    match e.resolve("nothing.html", Some("dark")) {
        Err(Error::TemplateNotFound { path, searched }) => {
            assert_eq!(path, "nothing.html");
            assert_eq!(searched, ["<dark>", "<default>"]);
        }
        other => panic!("Expected not found, got {other:?}"),
    }
}

#[test]
fn theme_page_extending_its_own_path_is_a_cycle() {
    let e = Engine::new(MemorySource::with_templates(
        "default",
        [("page.html", "@block content {}")],
    ))
    .with_theme(
        "wrap",
        MemorySource::with_templates(
            "wrap",
            [("page.html", "@extends(\"page.html\")@block content {x}")],
        ),
    )
    .unwrap();
    let env = RenderEnv::new().theme("wrap");
    assert!(matches!(
        e.render("page.html", &Context::new(), &env),
        Err(Error::CyclicInheritance { .. })
    ));
}

fn write(dir: &Path, path: &str, content: &str) {
    let file = dir.join(path);
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

#[test]
fn theme_falls_back_past_files_and_directories() {
    let dir = tempfile::tempdir().unwrap();
    let default = dir.path().join("default");
    let theme = dir.path().join("theme");
    write(&default, "snippets/x.html", "X");
    write(&default, "page.html", "P");
    // A file where the default root has a directory, and the other
    // way around.
    write(&theme, "snippets", "not a directory");
    fs::create_dir_all(theme.join("page.html")).unwrap();

    let e = Engine::new(DirSource::new(&default))
        .with_theme("t", DirSource::new(&theme))
        .unwrap();
    let env = RenderEnv::new().theme("t");
    assert_eq!(e.render("snippets/x.html", &Context::new(), &env).unwrap(), "X");
    assert_eq!(e.render("page.html", &Context::new(), &env).unwrap(), "P");
    assert_eq!(e.resolve("page.html", Some("t")).unwrap().origin.root, "default");
}

#[test]
fn default_root_name_is_not_a_theme() {
    let result = Engine::new(MemorySource::with_templates(
        "default",
        [("p.html", "base")],
    ))
    .with_theme("default", MemorySource::with_templates("x", [("p.html", "themed")]));
    assert!(matches!(
        result,
        Err(Error::ReservedThemeName(name)) if name == "default"
    ));
}

#[test]
fn directory_roots() {
    let dir = tempfile::tempdir().unwrap();
    let default = dir.path().join("templates");
    let theme = dir.path().join("themes/dark");
    write(&default, "page.html", "<body>@block content {}</body>\n");
    write(
        &default,
        "user/read.html",
        "@extends(\"page.html\")\n@block content {@h.display_name(user)}\n",
    );
    write(&theme, "page.html", "<body class=\"dark\">@block content {}</body>\n");

    let e = Engine::new(DirSource::new(&default))
        .with_theme("dark", DirSource::new(&theme))
        .unwrap();
    let ctx = Context::new().with("user", templayer::Value::map([("fullname", "Kim")]));
    assert_eq!(
        e.render("user/read.html", &ctx, &RenderEnv::new()).unwrap(),
        "<body>Kim</body>\n"
    );
    assert_eq!(
        e.render("user/read.html", &ctx, &RenderEnv::new().theme("dark")).unwrap(),
        "<body class=\"dark\">Kim</body>\n"
    );
    assert!(matches!(
        e.resolve("../secret.html", None),
        Err(Error::InvalidPath(_))
    ));
}
