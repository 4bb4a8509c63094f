use crate::error::{Error, Result};

/// Splits a `<project>/<chart>` name into its two segments.
pub fn parse_chart_name(name: &str) -> Result<(&str, &str)> {
    let mut segments = name.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(project), Some(chart), None) if !project.is_empty() && !chart.is_empty() => {
            Ok((project, chart))
        }
        _ => Err(Error::InvalidNameFormat(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_name() {
        assert_eq!(
            parse_chart_name("library/nginx").unwrap(),
            ("library", "nginx")
        );
        assert_eq!(parse_chart_name("a/b").unwrap(), ("a", "b"));

        for name in [
            "",
            "/",
            "nginx",
            "library/",
            "/nginx",
            "library/nginx/extra",
            "library//nginx",
        ] {
            match parse_chart_name(name) {
                Err(Error::InvalidNameFormat(rejected)) => assert_eq!(rejected, name),
                other => panic!("{:?} should be rejected, got {:?}", name, other),
            }
        }
    }
}
