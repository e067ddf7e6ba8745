// ─────────────────────────────── Tests ───────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::listing::price::{PatternOutcome, PriceClass, classify, parse_number};
    use crate::listing::*;

    fn price_of(text: &str) -> Option<Price> {
        extract_price(&normalize(text))
    }

    fn tags_of(text: &str) -> Vec<String> {
        extract_locations(&normalize(text))
    }

    // ── Normalization ──

    #[test]
    fn normalize_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize("  Cho  THUÊ\t nhà  "), "cho thuê nhà");
    }

    #[test]
    fn normalize_keeps_one_line_break_per_run() {
        assert_eq!(normalize("Area: Hoa Xuan \r\n\n  Giá: 7 triệu\n"), "area: hoa xuan\ngiá: 7 triệu");
    }

    #[test]
    fn normalize_composes_decomposed_vietnamese() {
        // "Mỹ" typed as "My" + combining tilde
        assert_eq!(normalize("My\u{0303} An"), "mỹ an");
        assert_eq!(normalize("ĐA\u{0300} NA\u{0306}\u{0303}NG"), normalize("Đà Nẵng"));
    }

    #[test]
    fn normalize_keeps_vietnamese_diacritics() {
        assert_eq!(normalize("ĐÀ NẴNG, Mỹ An"), "đà nẵng, mỹ an");
    }

    #[test]
    fn normalize_keeps_separators_for_price_parser() {
        assert_eq!(normalize("15.000.000 VND, 1,5 TR"), "15.000.000 vnd, 1,5 tr");
    }

    #[test]
    fn normalize_maps_typographic_variants() {
        assert_eq!(normalize("１５\u{00a0}000\u{202f}000 ₫ — ＄"), "15 000 000 ₫ - $");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "Cho thuê nhà My An, giá 12 triệu",
            "  Квартира   у МОРЯ\n\nЦена: 500$ ",
            "ЦІНА １２ млн — Đà Nẵng",
            "İstanbul ΣΟΦΟΣ",
            "Cho thue\u{0302} nha\u{0300} My\u{0303} An",
            "Area:\r\n\n Hoa Xuan\u{00a0}\n",
            "",
            "\n\t ",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    // ── Price: explicit Vietnamese ──

    #[test]
    fn price_trieu_is_millions_of_dong() {
        assert_eq!(price_of("15 triệu"), Some(Price::vnd(15_000_000)));
    }

    #[test]
    fn price_tr_suffix_without_space() {
        assert_eq!(price_of("House in Khuê Mỹ district\n15tr/tháng"), Some(Price::vnd(15_000_000)));
    }

    #[test]
    fn price_million_in_russian() {
        assert_eq!(price_of("Квартира, 20 млн в месяц"), Some(Price::vnd(20_000_000)));
    }

    #[test]
    fn price_million_english_with_dong() {
        assert_eq!(
            price_of("Studio apartment in Hòa Hải area\nPrice: 8 million VND per month"),
            Some(Price::vnd(8_000_000))
        );
    }

    #[test]
    fn price_decimal_millions() {
        assert_eq!(price_of("giá 1,5 tr"), Some(Price::vnd(1_500_000)));
        assert_eq!(price_of("6.5 triệu/tháng"), Some(Price::vnd(6_500_000)));
    }

    #[test]
    fn price_tr_does_not_match_inside_word() {
        // "trung tâm" must not be read as "12 tr"
        assert_eq!(
            classify("phòng 12 trung tâm")[0],
            (PriceClass::VndMillion, PatternOutcome::Unmatched)
        );
    }

    #[test]
    fn price_thousands_word() {
        assert_eq!(price_of("500 nghìn / ngày"), Some(Price::vnd(500_000)));
        assert_eq!(price_of("300 тыс"), Some(Price::vnd(300_000)));
    }

    #[test]
    fn price_k_suffix_is_thousands_of_dong() {
        assert_eq!(price_of("Phòng 500k/tháng"), Some(Price::vnd(500_000)));
        assert_eq!(price_of("giá 4500k"), Some(Price::vnd(4_500_000)));
        assert_eq!(price_of("Studio 7000k"), Some(Price::vnd(7_000_000)));
        assert_eq!(price_of("500 K / đêm"), Some(Price::vnd(500_000)));
    }

    #[test]
    fn k_must_stand_alone() {
        // "5 km" is a distance, not 5,000 dong
        assert_eq!(price_of("Villa 5 km from the beach"), None);
    }

    #[test]
    fn labeled_number_running_into_a_word_is_skipped() {
        assert_eq!(price_of("giá 4500abc"), None);
        assert_eq!(price_of("price 12x, price 400"), Some(Price::usd(400)));
    }

    #[test]
    fn price_explicit_dong_without_multiplier() {
        assert_eq!(price_of("Rent: 15,000,000 VND"), Some(Price::vnd(15_000_000)));
        assert_eq!(price_of("7.000.000đ"), Some(Price::vnd(7_000_000)));
    }

    // ── Price: USD ──

    #[test]
    fn price_dollar_prefix() {
        assert_eq!(price_of("$500"), Some(Price::usd(500)));
    }

    #[test]
    fn price_usd_suffix() {
        assert_eq!(price_of("500 usd"), Some(Price::usd(500)));
        assert_eq!(price_of("Цена 650$"), Some(Price::usd(650)));
        assert_eq!(price_of("800 долларов"), Some(Price::usd(800)));
    }

    #[test]
    fn district_number_is_not_part_of_price() {
        assert_eq!(price_of("quận 7 600$"), Some(Price::usd(600)));
        assert_eq!(price_of("Q.7 600 usd"), Some(Price::usd(600)));
        assert_eq!(price_of("District 1 600 000 VND"), Some(Price::vnd(600_000)));
        assert_eq!(price_of("Căn hộ quận 2 12 triệu"), Some(Price::vnd(12_000_000)));
    }

    #[test]
    fn price_usd_is_never_scaled_by_magnitude() {
        assert_eq!(price_of("$12,000 per month"), Some(Price::usd(12_000)));
    }

    #[test]
    fn price_usd_with_per_month() {
        assert_eq!(price_of("2BR in An Thượng beach\nRent $600/month"), Some(Price::usd(600)));
    }

    #[test]
    fn vietnamese_class_wins_over_usd() {
        assert_eq!(price_of("$500 or 12 triệu"), Some(Price::vnd(12_000_000)));
    }

    // ── Price: label + magnitude heuristic ──

    #[test]
    fn labeled_small_number_is_usd() {
        assert_eq!(price_of("price: 500"), Some(Price::usd(500)));
    }

    #[test]
    fn labeled_large_number_is_vnd() {
        assert_eq!(price_of("price: 15000000"), Some(Price::vnd(15_000_000)));
    }

    #[test]
    fn magnitude_threshold_is_inclusive_for_vnd() {
        assert_eq!(price_of("price: 9999"), Some(Price::usd(9_999)));
        assert_eq!(price_of("price: 10000"), Some(Price::vnd(10_000)));
    }

    #[test]
    fn labeled_ukrainian_and_vietnamese() {
        assert_eq!(price_of("Ціна: 450"), Some(Price::usd(450)));
        assert_eq!(price_of("Giá: 15.000.000"), Some(Price::vnd(15_000_000)));
    }

    #[test]
    fn labeled_rent_with_grouped_number() {
        let text = "Luxury 1BR Apartment – Da Nang City Center\n• 💵 Rent: 15,000,000\n📞 Zalo: +84 931 82 43 06";
        assert_eq!(price_of(text), Some(Price::vnd(15_000_000)));
    }

    #[test]
    fn labeled_skips_room_counts() {
        assert_eq!(price_of("For rent 2 bedrooms, price 700"), Some(Price::usd(700)));
        assert_eq!(price_of("for rent 2 bedrooms near beach"), None);
    }

    #[test]
    fn per_month_bare_number() {
        assert_eq!(price_of("Nice studio 450/month"), Some(Price::usd(450)));
    }

    #[test]
    fn no_price_is_absent() {
        assert_eq!(price_of("Cho thuê nhà đẹp gần biển, liên hệ"), None);
        assert_eq!(price_of(""), None);
    }

    #[test]
    fn price_extraction_is_deterministic() {
        let text = normalize("Cho thuê nhà My An, giá 12 triệu, $400 deposit");
        assert_eq!(extract_price(&text), extract_price(&text));
    }

    // ── Number parsing ──

    #[test]
    fn parses_grouped_numbers() {
        assert_eq!(parse_number("15.000.000"), Some(15_000_000.0));
        assert_eq!(parse_number("15,000,000"), Some(15_000_000.0));
        assert_eq!(parse_number("15 000 000"), Some(15_000_000.0));
        assert_eq!(parse_number("1.500"), Some(1_500.0));
    }

    #[test]
    fn parses_mixed_separators() {
        assert_eq!(parse_number("1,500.50"), Some(1_500.5));
        assert_eq!(parse_number("1.500,5"), Some(1_500.5));
        assert_eq!(parse_number("15.000,000"), Some(15_000_000.0));
    }

    #[test]
    fn parses_decimals() {
        assert_eq!(parse_number("1.5"), Some(1.5));
        assert_eq!(parse_number("12,5"), Some(12.5));
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert_eq!(parse_number("1.5.3"), None);
        assert_eq!(parse_number("12a"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("99999999999999999999999"), None);
    }

    #[test]
    fn malformed_number_falls_through_to_next_class() {
        let text = "giá 99999999999999999999999 triệu, 400 usd";
        let outcomes = classify(&normalize(text));
        assert_eq!(outcomes[0], (PriceClass::VndMillion, PatternOutcome::Malformed));
        assert_eq!(outcomes[3], (PriceClass::Usd, PatternOutcome::Matched(Price::usd(400))));
        assert_eq!(price_of(text), Some(Price::usd(400)));
    }

    // ── Price formatting ──

    #[test]
    fn price_display_uses_currency() {
        assert_eq!(Price::usd(500).to_string(), "$500");
        assert_eq!(Price::vnd(15_000_000).to_string(), "15,000,000 ₫");
    }

    #[test]
    fn bare_amount_threshold() {
        assert_eq!(Currency::infer(9_999), Currency::Usd);
        assert_eq!(Currency::infer(10_000), Currency::Vnd);
    }

    // ── Locations ──

    #[test]
    fn finds_named_area() {
        assert_eq!(tags_of("Cho thuê nhà My An, giá 12 triệu"), vec!["My An"]);
    }

    #[test]
    fn finds_area_with_diacritics() {
        assert_eq!(tags_of("Type: Studio\n- Price: 12 million\n- Area: Mỹ An"), vec!["My An"]);
    }

    #[test]
    fn locations_in_order_of_appearance() {
        let tags = tags_of("Tran Phu Street, Hai Chau District – heart of Da Nang");
        assert_eq!(tags, vec!["Tran Phu", "Hai Chau", "Da Nang"]);
    }

    #[test]
    fn longest_match_wins() {
        assert_eq!(tags_of("Căn hộ bãi biển Mỹ An"), vec!["My An Beach"]);
        assert_eq!(tags_of("nhà an thượng 2"), vec!["An Thuong 2"]);
    }

    #[test]
    fn overlapping_names_resolve_longest_first() {
        // "mỹ an" straddles both names; the two longer ones win
        assert_eq!(tags_of("khuê mỹ an thượng"), vec!["Khue My", "An Thuong"]);
    }

    #[test]
    fn match_requires_word_boundary() {
        assert!(tags_of("hueing colors").is_empty());
        assert!(tags_of("mydanang").is_empty());
    }

    #[test]
    fn stems_match_slavic_endings() {
        assert_eq!(tags_of("Квартира в Дананге, рядом с пляжем"), vec!["Da Nang", "Beach"]);
        assert_eq!(tags_of("в центре города"), vec!["City Center"]);
    }

    #[test]
    fn duplicates_are_removed_keeping_first() {
        assert_eq!(tags_of("Da Nang, Đà Nẵng, дананг, Hoi An"), vec!["Da Nang", "Hoi An"]);
    }

    #[test]
    fn numbered_districts() {
        assert_eq!(
            tags_of("Apartment for rent in District 1, Ho Chi Minh City"),
            vec!["District 1", "Ho Chi Minh City"]
        );
        assert_eq!(tags_of("căn hộ quận 7"), vec!["District 7"]);
    }

    #[test]
    fn no_location_is_empty() {
        assert!(tags_of("Cho thuê căn hộ, liên hệ zalo").is_empty());
    }

    #[test]
    fn decomposed_text_gets_same_tags() {
        let decomposed = "Cho thuê nhà My\u{0303} An, giá 12 triệu";
        let composed = "Cho thuê nhà Mỹ An, giá 12 triệu";
        assert_eq!(tags_of(decomposed), vec!["My An"]);
        assert_eq!(tags_of(decomposed), tags_of(composed));
    }

    #[test]
    fn labeled_area_becomes_tag() {
        assert_eq!(
            tags_of("Căn hộ 2PN\nArea: Hoa Xuan\nGiá: 7 triệu"),
            vec!["Hoa Xuan"]
        );
        assert_eq!(tags_of("Khu vực: Hòa Xuân, gần sông"), vec!["Hòa Xuân"]);
        assert_eq!(tags_of("Район: Хоа Суан рядом с рекой"), vec!["Хоа Суан"]);
    }

    #[test]
    fn labeled_area_keeps_position_among_known_tags() {
        assert_eq!(
            tags_of("Da Nang apartment. Location: Hoa Xuan near Beach"),
            vec!["Da Nang", "Hoa Xuan", "Beach"]
        );
    }

    #[test]
    fn known_names_win_over_labeled_text() {
        assert_eq!(tags_of("Location: District 3"), vec!["District 3"]);
        assert_eq!(tags_of("Area: My An Beach"), vec!["My An Beach"]);
    }

    #[test]
    fn address_names_become_tags() {
        assert_eq!(tags_of("Nhà nguyên căn đường Lê Lợi, 10 triệu"), vec!["Lê Lợi"]);
        assert_eq!(tags_of("Квартира, ул. Ленина 5"), vec!["Ленина"]);
        assert_eq!(tags_of("Phường An Khê Bắc gần chợ"), vec!["An Khê Bắc"]);
    }

    #[test]
    fn empty_label_gives_no_tag() {
        assert!(tags_of("Location: near the airport").is_empty());
        assert!(tags_of("Area: 45m2").is_empty());
    }

    #[test]
    fn gazetteer_aliases_are_normalized_and_tags_unique() {
        use crate::listing::gazetteer::{GAZETTEER, LocationKind};

        let mut seen = std::collections::HashSet::new();
        for place in GAZETTEER {
            assert!(seen.insert(place.tag), "duplicate tag {}", place.tag);
            for alias in place.aliases {
                let alias = alias.trim_end_matches('*');
                assert_eq!(normalize(alias), alias, "alias of {}", place.tag);
            }
        }
        assert!(
            GAZETTEER
                .iter()
                .any(|p| p.kind == LocationKind::City && p.tag == "Da Nang")
        );
    }

    // ── Record builder ──

    fn raw(id: i64, text: &str) -> RawMessage {
        RawMessage {
            id,
            channel: "danang_rent".into(),
            date: Utc.with_ymd_and_hms(2025, 12, 1, 10, 0, 0).unwrap(),
            text: text.into(),
            photo_ids: vec![id, id + 1],
            views: Some(120),
            link: String::new(),
        }
    }

    #[test]
    fn builds_record_from_message() {
        let record = build_record(raw(42, "Cho thuê nhà My An, giá 12 triệu"));
        assert_eq!(record.id, 42);
        assert_eq!(record.channel, "danang_rent");
        assert_eq!(record.raw_text, "Cho thuê nhà My An, giá 12 triệu");
        assert_eq!(record.price, Some(Price::vnd(12_000_000)));
        assert_eq!(record.location, vec!["My An"]);
        assert_eq!(record.photo_ids, vec![42, 43]);
        assert_eq!(record.views, Some(120));
        assert_eq!(record.link, "https://t.me/danang_rent/42");
    }

    #[test]
    fn keeps_source_link_when_present() {
        let mut msg = raw(7, "studio $400");
        msg.link = "https://t.me/c/123/7".into();
        assert_eq!(build_record(msg).link, "https://t.me/c/123/7");
    }

    #[test]
    fn record_serializes_price_and_tags() {
        let json = serde_json::to_value(build_record(raw(1, "Studio Hoi An $500"))).unwrap();
        assert_eq!(json["price"]["amount"], 500);
        assert_eq!(json["price"]["currency"], "USD");
        assert_eq!(json["location"][0], "Hoi An");
        assert_eq!(json["raw_text"], "Studio Hoi An $500");
    }

    #[test]
    fn rebuilding_same_message_is_identical() {
        let a = build_record(raw(3, "Квартира у моря, Сон Тра, 18 млн"));
        let b = build_record(raw(3, "Квартира у моря, Сон Тра, 18 млн"));
        assert_eq!(a, b);
        assert_eq!(a.location, vec!["Beach", "Son Tra"]);
    }
}
