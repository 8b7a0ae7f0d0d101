/// Tests for report layout
#[cfg(test)]
mod tests {
    use crate::config::{ImageSizing, ImagesConfig, PageGeometry, ReportConfig};
    use crate::error::AppError;
    use crate::fetch::{ImageLoadError, ImageSource};
    use crate::report::layout::*;
    use crate::report::types::{Align, Document, DrawOp, Rgb};
    use crate::types::{Cell, Grid};
    use image::DynamicImage;

    /// Returns blank images, failing for any URL containing one of `fail`
    struct ScriptedSource {
        fail: Vec<&'static str>,
        size: (u32, u32),
        requested: Vec<String>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self { fail: Vec::new(), size: (300, 200), requested: Vec::new() }
        }

        fn failing(fail: Vec<&'static str>) -> Self {
            Self { fail, ..Self::new() }
        }
    }

    impl ImageSource for ScriptedSource {
        fn load(&mut self, url: &str) -> Result<DynamicImage, ImageLoadError> {
            self.requested.push(url.to_string());
            if self.fail.iter().any(|f| url.contains(f)) {
                return Err(ImageLoadError::Status(404));
            }
            Ok(DynamicImage::new_rgb8(self.size.0, self.size.1))
        }
    }

    fn header() -> Vec<Cell> {
        vec![
            Cell::from("Carimbo de data/hora"),
            Cell::from("Nome completo"),
            Cell::from("Setor"),
            Cell::from("Foto"),
            Cell::from("Descrição"),
        ]
    }

    fn row(stamp: Cell, photos: &str, description: &str) -> Vec<Cell> {
        vec![stamp, Cell::from("Ana Souza"), Cell::from("Norte"), Cell::from(photos), Cell::from(description)]
    }

    fn grid(rows: Vec<Vec<Cell>>) -> Grid {
        let mut all = vec![header()];
        all.extend(rows);
        Grid::new(all)
    }

    fn texts(doc: &Document) -> Vec<String> {
        doc.texts().map(str::to_string).collect()
    }

    /// Top of the space an op reserved; a rule sits 5mm into its band
    fn block_top(op: &DrawOp) -> f32 {
        match op {
            DrawOp::Text { y, .. } | DrawOp::Image { y, .. } | DrawOp::Link { y, .. } => *y,
            DrawOp::Rule { y, .. } => *y - 5.0,
        }
    }

    /// Nothing except the footer may extend below the content bottom
    fn assert_within_content(doc: &Document, page: &PageGeometry) {
        let bottom = page.content_bottom() + 1e-3;
        for (i, p) in doc.pages.iter().enumerate() {
            for op in &p.ops {
                match op {
                    DrawOp::Text { y, align: Align::Left, text, .. } => {
                        assert!(*y <= bottom, "text {:?} at {} below content on page {}", text, y, i + 1)
                    }
                    DrawOp::Image { y, height, .. } => {
                        assert!(y + height <= bottom, "image at {}+{} below content on page {}", y, height, i + 1)
                    }
                    DrawOp::Rule { y, .. } => assert!(*y <= bottom),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn test_single_entry_scenario() {
        let g = grid(vec![row(Cell::Number(45000.0), "https://drive.google.com/file/d/ABC123/view", "leak detected")]);
        let mut source = ScriptedSource::new();
        let doc = layout_report(&g, &ReportConfig::default(), &mut source).expect("layout succeeds");

        assert_eq!(doc.entries, 1);
        assert_eq!(doc.page_count(), 1);
        let t = texts(&doc);
        assert_eq!(t[0], "Relatório de Inspeção UMB");
        assert!(t.contains(&"Autor: Ana Souza".to_string()));
        assert!(t.contains(&"Setor: Norte".to_string()));
        assert!(t.contains(&"Data/Hora: 15/03/2023 00:00:00".to_string()));
        assert!(t.contains(&"Descrição: leak detected".to_string()));
        assert!(t.contains(&"Imagens:".to_string()));

        assert_eq!(source.requested.len(), 1);
        assert!(source.requested[0].contains("ABC123"));
        let link = doc.pages[0].ops.iter().find_map(|op| match op {
            DrawOp::Link { url, .. } => Some(url.clone()),
            _ => None,
        });
        assert_eq!(link.as_deref(), Some("https://lh3.googleusercontent.com/d/ABC123=w1000"));
        assert_eq!(doc.images.len(), 1);
    }

    #[test]
    fn test_failed_image_is_reported_inline_and_layout_continues() {
        let g = grid(vec![
            row(Cell::text("2024-01-10"), "https://bad.example/a.jpg, https://ok.example/b.jpg", "first"),
            row(Cell::text("2024-01-11"), "https://ok.example/c.jpg", "second"),
        ]);
        let mut source = ScriptedSource::failing(vec!["bad.example"]);
        let doc = layout_report(&g, &ReportConfig::default(), &mut source).expect("layout succeeds");

        assert_eq!(doc.failed_images, 1);
        assert_eq!(doc.images.len(), 2);
        assert_eq!(source.requested.len(), 3);

        let ops: Vec<&DrawOp> = doc.pages.iter().flat_map(|p| p.ops.iter()).collect();
        let err_at = ops
            .iter()
            .position(|op| matches!(op, DrawOp::Text { text, .. } if text.starts_with("[ERRO]")))
            .expect("error line present");
        match ops[err_at] {
            DrawOp::Text { text, color, size, .. } => {
                assert_eq!(text, "[ERRO] Não foi possível carregar imagem: https://bad.example/a.jpg");
                assert_eq!(*color, Rgb::ERROR_RED);
                assert_eq!(*size, 8.0);
            }
            _ => unreachable!(),
        }
        // The pen is black again for everything after the error line
        for op in &ops[err_at + 1..] {
            if let DrawOp::Text { color, .. } = op {
                assert_eq!(*color, Rgb::BLACK);
            }
        }
        assert!(texts(&doc).contains(&"Descrição: second".to_string()));
    }

    #[test]
    fn test_missing_required_column_aborts_before_any_page() {
        let g = Grid::new(vec![
            vec![Cell::from("Carimbo de data/hora"), Cell::from("Foto")],
            vec![Cell::Number(45000.0), Cell::from("https://x/1.jpg")],
        ]);
        let mut source = ScriptedSource::new();
        match layout_report(&g, &ReportConfig::default(), &mut source) {
            Err(AppError::MissingColumns(names)) => assert_eq!(names, vec!["descrição".to_string()]),
            other => panic!("expected schema error, got {:?}", other.map(|d| d.page_count())),
        }
        assert!(source.requested.is_empty());
    }

    #[test]
    fn test_header_only_grid_has_nothing_to_report() {
        let g = grid(vec![]);
        let result = layout_report(&g, &ReportConfig::default(), &mut ScriptedSource::new());
        assert!(matches!(result, Err(AppError::NoReportData)));
        assert!(matches!(layout_report(&Grid::default(), &ReportConfig::default(), &mut ScriptedSource::new()), Err(AppError::NoReportData)));
    }

    #[test]
    fn test_optional_columns_fall_back_to_placeholders() {
        let g = Grid::new(vec![
            vec![Cell::from("Carimbo de data/hora"), Cell::from("Foto"), Cell::from("Descrição")],
            vec![Cell::text("garbage date"), Cell::Empty, Cell::Empty],
        ]);
        let doc = layout_report(&g, &ReportConfig::default(), &mut ScriptedSource::new()).expect("layout succeeds");
        let t = texts(&doc);
        assert!(t.contains(&"Autor: Não Informado".to_string()));
        assert!(t.contains(&"Setor: Não Informado".to_string()));
        assert!(t.contains(&"Data/Hora: garbage date".to_string()));
        assert!(t.contains(&"Descrição: N/A".to_string()));
        assert!(t.contains(&"Imagens: Nenhuma imagem fornecida.".to_string()));
        assert!(!t.contains(&"Imagens:".to_string()));
    }

    #[test]
    fn test_every_page_gets_a_numbered_footer() {
        let rows = (0..30).map(|i| row(Cell::Number(45000.0 + i as f64), "", &format!("entry {}", i))).collect();
        let doc = layout_report(&grid(rows), &ReportConfig::default(), &mut ScriptedSource::new()).expect("layout");
        let total = doc.page_count();
        assert!(total > 1);

        for (i, page) in doc.pages.iter().enumerate() {
            match page.ops.last() {
                Some(DrawOp::Text { text, align, x, y, size, .. }) => {
                    assert_eq!(text, &format!("Página {} de {}", i + 1, total));
                    assert_eq!(*align, Align::Right);
                    assert_eq!((*x, *y, *size), (200.0, 287.0, 8.0));
                }
                other => panic!("page {} does not end with a footer: {:?}", i + 1, other),
            }
        }
    }

    #[test]
    fn test_blocks_never_split_and_new_pages_start_at_margin() {
        let rows = (0..25)
            .map(|i| row(Cell::Number(45000.0), "https://img.example/1.jpg", &format!("entry {}", i)))
            .collect();
        let config = ReportConfig::default();
        let doc = layout_report(&grid(rows), &config, &mut ScriptedSource::new()).expect("layout");

        assert_within_content(&doc, &config.page);
        for page in doc.pages.iter().skip(1) {
            assert_eq!(block_top(&page.ops[0]), config.page.margin);
        }
        // The author/sector/timestamp block always stays together
        for page in &doc.pages {
            for (i, op) in page.ops.iter().enumerate() {
                if let DrawOp::Text { text, .. } = op
                    && text.starts_with("Autor:")
                {
                    assert!(matches!(&page.ops[i + 1], DrawOp::Text { text, .. } if text.starts_with("Setor:")));
                    assert!(matches!(&page.ops[i + 2], DrawOp::Text { text, .. } if text.starts_with("Data/Hora:")));
                }
            }
        }
    }

    #[test]
    fn test_overlong_description_is_split_into_page_sized_groups() {
        let long = "palavra ".repeat(3000);
        let config = ReportConfig::default();
        let doc = layout_report(&grid(vec![row(Cell::Number(45000.0), "", &long)]), &config, &mut ScriptedSource::new())
            .expect("layout");

        assert!(doc.page_count() >= 3);
        assert_within_content(&doc, &config.page);
        let words: usize = doc.texts().filter(|t| t.starts_with("palavra") || t.starts_with("Descrição:")).map(|t| t.matches("palavra").count()).sum();
        assert_eq!(words, 3000);
    }

    #[test]
    fn test_image_moves_to_next_page_when_too_little_room() {
        let mut config = ReportConfig::default();
        config.page.height = 200.0;
        let g = grid(vec![row(Cell::Number(45000.0), "https://img/1.jpg,https://img/2.jpg", "d")]);
        let doc = layout_report(&g, &config, &mut ScriptedSource::new()).expect("layout");

        let image_pos = |page: usize| {
            doc.pages[page].ops.iter().find_map(|op| match op {
                DrawOp::Image { y, height, .. } => Some((*y, *height)),
                _ => None,
            })
        };
        // title 15 -> 27, header block -> 45, description -> 51 + 2, label -> 61
        assert_eq!(image_pos(0), Some((61.0, 100.0)));
        assert_eq!(image_pos(1), Some((10.0, 100.0)));
    }

    #[test]
    fn test_image_shrinks_when_enough_room_remains() {
        let mut config = ReportConfig::default();
        config.page.height = 150.0;
        let g = grid(vec![row(Cell::Number(45000.0), "https://img/1.jpg", "d")]);
        let doc = layout_report(&g, &config, &mut ScriptedSource::new()).expect("layout");

        assert_eq!(doc.page_count(), 2);
        let placed = doc.pages[0].ops.iter().find_map(|op| match op {
            DrawOp::Image { x, y, width, height, .. } => Some((*x, *y, *width, *height)),
            _ => None,
        });
        let (x, y, w, h) = placed.expect("image on first page");
        // content bottom 130, cursor 61: 69mm left, source aspect 3:2
        assert_eq!(y, 61.0);
        assert!((h - 69.0).abs() < 1e-3);
        assert!((w - 103.5).abs() < 1e-3);
        assert!((x - (10.0 + (190.0 - 103.5) / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_links_can_be_disabled() {
        let mut config = ReportConfig::default();
        config.images.link = false;
        let g = grid(vec![row(Cell::Number(45000.0), "https://img/1.jpg", "d")]);
        let doc = layout_report(&g, &config, &mut ScriptedSource::new()).expect("layout");
        assert!(!doc.pages[0].ops.iter().any(|op| matches!(op, DrawOp::Link { .. })));
        assert_eq!(doc.images.len(), 1);
    }

    #[test]
    fn test_desired_image_size() {
        let fixed = ImagesConfig::default();
        assert_eq!(desired_image_size(&fixed, 4000, 100, 190.0), (150.0, 100.0));

        let prop = ImagesConfig { sizing: ImageSizing::Proportional, ..Default::default() };
        let (w, h) = desired_image_size(&prop, 400, 200, 190.0);
        assert!((w - 190.0).abs() < 1e-3, "width {}", w);
        assert!((h - 95.0).abs() < 1e-3, "height {}", h);
        let (w, h) = desired_image_size(&prop, 100, 200, 190.0);
        assert!((w - 60.0).abs() < 1e-3, "width {}", w);
        assert!((h - 120.0).abs() < 1e-3, "height {}", h);

        let (w, h) = desired_image_size(&fixed, 10, 10, 100.0);
        assert_eq!(w, 100.0);
        assert!((h - 100.0 * 100.0 / 150.0).abs() < 1e-3);
    }

    #[test]
    fn test_report_row_projection() {
        use crate::columns::ColumnMap;
        use crate::dates::DateNormalizer;

        let config = ReportConfig::default();
        let columns = ColumnMap::resolve(&header(), &config.columns);
        let r = row(Cell::Number(45000.5), " https://a/1.jpg , ,https://a/2.jpg", "x");
        let entry = ReportRow::from_cells(&r, &columns, &config, &DateNormalizer::default());
        assert_eq!(entry.timestamp, "15/03/2023 12:00:00");
        assert_eq!(entry.photo_urls, vec!["https://a/1.jpg", "https://a/2.jpg"]);
        assert_eq!(entry.author, "Ana Souza");
    }
}
