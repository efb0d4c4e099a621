// ---------------------------------------------------------------------------
// Region code table
// ---------------------------------------------------------------------------

/// Width the candidate number is zero-padded to before taking the prefix.
pub const PADDED_ID_WIDTH: usize = 8;

const PROVINCE_CODES: &[(&str, &str)] = &[
    ("01", "Hà Nội"),
    ("02", "TP. HCM"),
    ("03", "Hải Phòng"),
    ("04", "Đà Nẵng"),
    ("05", "Hà Giang"),
    ("06", "Cao Bằng"),
    ("07", "Lai Châu"),
    ("08", "Lào Cai"),
    ("09", "Tuyên Quang"),
    ("10", "Lạng Sơn"),
    ("11", "Bắc Kạn"),
    ("12", "Thái Nguyên"),
    ("13", "Yên Bái"),
    ("14", "Sơn La"),
    ("15", "Phú Thọ"),
    ("16", "Vĩnh Phúc"),
    ("17", "Quảng Ninh"),
    ("18", "Bắc Giang"),
    ("19", "Bắc Ninh"),
    ("21", "Hải Dương"),
    ("22", "Hưng Yên"),
    ("23", "Hòa Bình"),
    ("24", "Hà Nam"),
    ("25", "Nam Định"),
    ("26", "Thái Bình"),
    ("27", "Ninh Bình"),
    ("28", "Thanh Hóa"),
    ("29", "Nghệ An"),
    ("30", "Hà Tĩnh"),
    ("31", "Quảng Bình"),
    ("32", "Quảng Trị"),
    ("33", "Thừa Thiên Huế"),
    ("34", "Quảng Nam"),
    ("35", "Quảng Ngãi"),
    ("36", "Kon Tum"),
    ("37", "Bình Định"),
    ("38", "Gia Lai"),
    ("39", "Phú Yên"),
    ("40", "Đắk Lắk"),
    ("41", "Khánh Hòa"),
    ("42", "Lâm Đồng"),
    ("43", "Bình Phước"),
    ("44", "Bình Dương"),
    ("45", "Ninh Thuận"),
    ("46", "Tây Ninh"),
    ("47", "Bình Thuận"),
    ("48", "Đồng Nai"),
    ("49", "Long An"),
    ("50", "Đồng Tháp"),
    ("51", "An Giang"),
    ("52", "Bà Rịa - Vũng Tàu"),
    ("53", "Tiền Giang"),
    ("54", "Kiên Giang"),
    ("55", "Cần Thơ"),
    ("56", "Bến Tre"),
    ("57", "Vĩnh Long"),
    ("58", "Trà Vinh"),
    ("59", "Sóc Trăng"),
    ("60", "Bạc Liêu"),
    ("61", "Cà Mau"),
    ("62", "Điện Biên"),
    ("63", "Đăk Nông"),
    ("64", "Hậu Giang"),
];

/// Immutable mapping from two-character region code to display name.
#[derive(Debug, Clone, Copy)]
pub struct RegionTable {
    entries: &'static [(&'static str, &'static str)],
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RegionTable {
    /// The province table compiled into the binary.
    pub const fn builtin() -> Self {
        RegionTable {
            entries: PROVINCE_CODES,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn lookup(&self, code: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
    }

    /// Derive `(code, name)` from a candidate number.
    ///
    /// The identifier is left-padded with `0` to [`PADDED_ID_WIDTH`] characters
    /// and its first two characters form the code. An empty identifier has no
    /// code; an unknown code has no name.
    pub fn derive(&self, candidate_id: &str) -> (Option<String>, Option<&'static str>) {
        let id = candidate_id.trim();
        if id.is_empty() {
            return (None, None);
        }
        let code = region_code(id);
        let name = self.lookup(&code);
        (Some(code), name)
    }
}

/// First two characters of `id` zero-padded to [`PADDED_ID_WIDTH`].
pub fn region_code(id: &str) -> String {
    let len = id.chars().count();
    let padding = PADDED_ID_WIDTH.saturating_sub(len);
    std::iter::repeat('0')
        .take(padding)
        .chain(id.chars())
        .take(2)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_digit_id_pads_to_hanoi() {
        let table = RegionTable::builtin();
        let (code, name) = table.derive("1234567");
        assert_eq!(code.as_deref(), Some("01"));
        assert_eq!(name, Some("Hà Nội"));
    }

    #[test]
    fn full_width_id_uses_own_prefix() {
        let (code, name) = RegionTable::builtin().derive("02000123");
        assert_eq!(code.as_deref(), Some("02"));
        assert_eq!(name, Some("TP. HCM"));
    }

    #[test]
    fn unknown_code_keeps_code_without_name() {
        // 20 is not assigned.
        let (code, name) = RegionTable::builtin().derive("20123456");
        assert_eq!(code.as_deref(), Some("20"));
        assert_eq!(name, None);
    }

    #[test]
    fn short_ids_pad_to_zero_prefix() {
        assert_eq!(region_code("42"), "00");
        assert_eq!(region_code("123456789"), "12");
    }

    #[test]
    fn empty_id_has_no_region() {
        assert_eq!(RegionTable::builtin().derive("  "), (None, None));
    }

    #[test]
    fn builtin_table_has_all_provinces() {
        assert_eq!(RegionTable::builtin().len(), 63);
    }
}
