//! `--dump`: print every page of a form as its placement commands.

use formlayout_engine::{Form, FormError, FormOptions};
use formlayout_syntax::outline;

pub fn dump(descriptor: &str, options: &FormOptions) -> Result<String, FormError> {
    let form = Form::build(descriptor, options)?;

    let mut out = String::new();
    for (index, page) in form.pages().iter().enumerate() {
        out.push_str(&header(index + 1, &form));
        for (key, value) in page.properties.iter() {
            out.push_str(&format!(" {key}={value:?}"));
        }
        out.push('\n');
        out.push_str(&outline(&page.root.commands()));
    }
    Ok(out)
}

fn header(number: usize, form: &Form) -> String {
    format!(
        "page {number}/{} {}x{}",
        form.page_count(),
        form.width(),
        form.height()
    )
}
