use crate::notify::Scheme;

pub async fn handle_schemes() -> anyhow::Result<()> {
    print!("{}", render_schemes());
    Ok(())
}

fn render_schemes() -> String {
    let width = Scheme::ALL
        .iter()
        .map(|scheme| scheme.as_str().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for scheme in Scheme::ALL {
        out.push_str(&format!(
            "{:width$}  {}\n",
            scheme.as_str(),
            scheme.pattern(),
            width = width
        ));
    }
    out
}
