//! Minimal PDF 1.4 writer for plain text reports.
//!
//! One built-in font (Helvetica, WinAnsi encoding), A4 pages, one text line per
//! report line. Characters outside Latin-1 are replaced with `?`.

const PAGE_WIDTH: usize = 595;
const PAGE_HEIGHT: usize = 842;
const MARGIN: usize = 56;
const TITLE_SIZE: usize = 16;
const FONT_SIZE: usize = 11;
const LEADING: usize = 15;
const LINES_PER_PAGE: usize = (PAGE_HEIGHT - 2 * MARGIN) / LEADING - 2;

// Object layout: 1 catalog, 2 page tree, 3 font, then a (page, content) pair
// per page.
fn page_object(page: usize) -> usize {
    4 + 2 * page
}

pub(crate) fn render(title: &str, lines: &[String]) -> Vec<u8> {
    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![&[]]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    let kids = (0..pages.len())
        .map(|page| format!("{} 0 R", page_object(page)))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];
    for (page, chunk) in pages.iter().enumerate() {
        let heading = (page == 0).then_some(title);
        let stream = content_stream(heading, chunk);
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            page_object(page) + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{stream}\nendstream",
            stream.len()
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (idx, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{body}\nendobj\n", idx + 1));
    }

    let xref = out.len();
    out.push_str(&format!(
        "xref\n0 {}\n0000000000 65535 f \n",
        objects.len() + 1
    ));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
        objects.len() + 1
    ));
    out.into_bytes()
}

fn content_stream(heading: Option<&str>, lines: &[String]) -> String {
    let mut stream = String::from("BT\n");
    stream.push_str(&format!("{MARGIN} {} Td\n", PAGE_HEIGHT - MARGIN));
    if let Some(heading) = heading {
        stream.push_str(&format!("/F1 {TITLE_SIZE} Tf\n"));
        stream.push_str(&format!("{} Tj\n", pdf_string(heading)));
        stream.push_str(&format!("0 -{} Td\n", 2 * LEADING));
    }
    stream.push_str(&format!("/F1 {FONT_SIZE} Tf\n{LEADING} TL\n"));
    for line in lines {
        stream.push_str(&format!("{} Tj\nT*\n", pdf_string(line)));
    }
    stream.push_str("ET");
    stream
}

fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", ch as u32)),
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn document_is_well_formed() {
        let bytes = render("Outubro", &["Received: R$ 10.00".to_string()]);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("(Outubro) Tj"));
        assert!(text.contains("(Received: R$ 10.00) Tj"));
        assert!(text.contains("/Count 1"));

        let startxref: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(text[startxref..].starts_with("xref\n0 6\n"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let text = String::from_utf8(render("t", &lines(3))).unwrap();
        let xref_start = text.find("xref\n").unwrap();
        let offsets: Vec<usize> = text[xref_start..]
            .lines()
            .skip(3)
            .take_while(|line| line.ends_with(" n "))
            .map(|line| line[..10].parse().unwrap())
            .collect();
        assert_eq!(offsets.len(), 5);
        for (idx, offset) in offsets.into_iter().enumerate() {
            assert!(text[offset..].starts_with(&format!("{} 0 obj", idx + 1)));
        }
    }

    #[test]
    fn long_reports_span_pages() {
        let text = String::from_utf8(render("t", &lines(LINES_PER_PAGE + 1))).unwrap();
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/Kids [4 0 R 6 0 R]"));
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(pdf_string("a(b)\\c"), "(a\\(b\\)\\\\c)");
        assert_eq!(pdf_string("ç"), "(\\347)");
        assert_eq!(pdf_string("✓"), "(?)");
    }
}
