// This module is only a chapter of the documentation.
//! This module describes the template syntax.
//!
//! The syntax is inspired by
//! [Twirl](https://github.com/playframework/twirl):
//! everything special starts with an `@` sign, and everything else is
//! copied to the output as is.
//!
//! A template is either a base page, or it starts by naming the
//! template it extends, and then (re)defines blocks of that template.
//!
//! ```text
//! @extends("page.html")
//!
//! @block title {@h.display_name(user) - @super()}
//! @block primary {
//!   <h1>@h.display_name(user)</h1>
//! }
//! ```
//!
//! The curly brackets, `{` and `}`, are used for blocks.
//! To use them in text, they must be escaped as `@{` and `@}`.
//! Likewise, a literal `@` is written `@@`.
//! Comments are written `@* like this *@`.
#![allow(non_snake_case)]

pub mod a_Value_expressions {
    //! A value expression starts with an @ sign and names a variable of
    //! the render context, optionally followed by field names.
    //!
    //! ```text
    //! <h1>@user.fullname</h1>
    //! <p>@pkg.organization.title</p>
    //! ```
    //!
    //! The value is html-escaped, unless it is the result of the
    //! `h.markdown` helper.
    //! Outputting a variable that is not defined is an error.
    //!
    //! Request scoped globals, such as the logged in user, are
    //! reached with the `g` prefix, in any template:
    //!
    //! ```text
    //! <span class="user">@g.user.name</span>
    //! ```
    //!
    //! The helpers supplied by the application are called with the `h`
    //! prefix.
    //! The available helpers are `check_access(action, target)`,
    //! `display_name(obj)`, `translate(key)`, `markdown(text)` and
    //! `follow_count(obj_type, obj_id)`; calling anything else is an
    //! error when the template is parsed.
    //!
    //! ```text
    //! <p>@h.translate("Followers"): @h.follow_count("user", user.id)</p>
    //! @h.markdown(user.about)
    //! ```
    //!
    //! Arguments are variables, string literals or integers.
}

pub mod b_Loops {
    //! A loop repeats its body for each item in a list.
    //!
    //! ```text
    //! <ul>@for res in pkg.resources {
    //!   <li>@res.name</li>}
    //! </ul>
    //! ```
    //!
    //! A null value is treated as an empty list.
}

pub mod c_Conditionals {
    //! Parts of a page can be rendered only when some condition holds.
    //! Null, false, zero and empty values are false, as is an
    //! undefined variable, so optional fields can be tested directly.
    //!
    //! ```text
    //! @if user.about {
    //!   @h.markdown(user.about)
    //! } else @if h.check_access("user_update", user) {
    //!   <p>Tell us about yourself!</p>
    //! } else {
    //!   <p>Nothing here.</p>
    //! }
    //! ```
    //!
    //! A condition can be negated: `@if !pkg.private { ... }`.
}

pub mod d_Blocks {
    //! Blocks are the places where a template can be changed by the
    //! templates that extend it.
    //!
    //! A base page defines blocks with their default content:
    //!
    //! ```text
    //! <html>
    //!   <head><title>@block title {Site}</title></head>
    //!   <body>@block content {
    //!     <main>@block primary {}</main>
    //!     <aside>@block secondary {}</aside>
    //!   }</body>
    //! </html>
    //! ```
    //!
    //! A template extending it redefines the blocks it wants to change.
    //! Blocks it does not mention keep the content from the parent.
    //! A block defined empty, `@block secondary {}`, removes the parent
    //! content.
    //!
    //! Inside a block, `@super()` renders the parent's definition of
    //! the same block, which may in turn use `@super()`.
    //!
    //! Each block name may only be defined once in a template.
    //! Anything outside of blocks in a template that extends another is
    //! ignored.
}

pub mod e_Snippets {
    //! A snippet is a template rendered in the middle of another one,
    //! with explicit parameters.
    //!
    //! ```text
    //! @include("snippets/follow_button.html", obj_type = "user", obj_id = user.id)
    //! ```
    //!
    //! The parameter values are evaluated where the snippet is
    //! included, and are the only variables the snippet can see.
    //! Globals (`g.*`) and helpers (`h.*`) are available as usual.
    //!
    //! Snippets are looked up in the active theme just like pages, and
    //! may extend other templates or include other snippets.
}

pub mod f_Themes {
    //! A theme is a directory of templates that override the default
    //! templates with the same path.
    //! When a theme is active, every template (the requested one, the
    //! ones it extends and all snippets) is looked for in the theme
    //! first and in the default templates second.
    //!
    //! A theme template can not extend the default template of the same
    //! path; since the theme is searched first, that would make it
    //! extend itself, which is an error.
}
