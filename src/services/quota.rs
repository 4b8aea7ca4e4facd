use serde::Serialize;
use utoipa::ToSchema;

/// Warning kicks in at 85% utilization, critical at 95%.
pub const WARNING_PERCENT: u8 = 85;
pub const CRITICAL_PERCENT: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiskTier {
    Ok,
    Warning,
    Critical,
}

impl DiskTier {
    /// Stable label, also used as the notification `type` column value.
    pub fn label(&self) -> &'static str {
        match self {
            DiskTier::Ok => "ok",
            DiskTier::Warning => "warning",
            DiskTier::Critical => "critical",
        }
    }
}

/// Derived on every quota check, never persisted.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct UsageSample {
    pub used_bytes: u64,
    pub capacity_bytes: u64,
    pub percent: u8,
    pub tier: DiskTier,
}

/// percent = min(100, round(used / capacity * 100)), tiered at 85/95.
pub fn classify(used_bytes: u64, capacity_bytes: u64) -> UsageSample {
    let raw = (used_bytes as f64 / capacity_bytes as f64) * 100.0;
    let percent = raw.round().clamp(0.0, 100.0) as u8;

    let tier = if percent >= CRITICAL_PERCENT {
        DiskTier::Critical
    } else if percent >= WARNING_PERCENT {
        DiskTier::Warning
    } else {
        DiskTier::Ok
    };

    UsageSample {
        used_bytes,
        capacity_bytes,
        percent,
        tier,
    }
}

/// Human-readable byte amounts for notification bodies and the dashboard.
pub fn format_bytes(bytes: u64) -> String {
    let gb = bytes as f64 / 1024.0 / 1024.0 / 1024.0;
    if gb >= 1.0 {
        return format!("{gb:.2} GB");
    }
    let mb = bytes as f64 / 1024.0 / 1024.0;
    if mb >= 1.0 {
        return format!("{mb:.0} MB");
    }
    let kb = bytes as f64 / 1024.0;
    if kb >= 1.0 {
        return format!("{kb:.0} KB");
    }
    format!("{bytes} B")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_empty_account() {
        let sample = classify(0, 1_000_000_000);
        assert_eq!(sample.percent, 0);
        assert_eq!(sample.tier, DiskTier::Ok);
    }

    #[test]
    fn test_classify_warning_boundary() {
        assert_eq!(classify(849_000_000, 1_000_000_000).tier, DiskTier::Ok);
        assert_eq!(classify(850_000_000, 1_000_000_000).tier, DiskTier::Warning);
    }

    #[test]
    fn test_classify_critical_boundary() {
        let sample = classify(950_000_000, 1_000_000_000);
        assert_eq!(sample.percent, 95);
        assert_eq!(sample.tier, DiskTier::Critical);
    }

    #[test]
    fn test_classify_clamps_overage() {
        let sample = classify(2_000_000_000, 1_000_000_000);
        assert_eq!(sample.percent, 100);
        assert_eq!(sample.tier, DiskTier::Critical);
    }

    #[test]
    fn test_classify_two_gib_plan() {
        // 1.9 GiB of a 2 GiB ceiling lands exactly on the critical threshold
        let capacity = 2 * 1024 * 1024 * 1024;
        let used = (1.9 * 1024.0 * 1024.0 * 1024.0) as u64;
        let sample = classify(used, capacity);
        assert_eq!(sample.percent, 95);
        assert_eq!(sample.tier, DiskTier::Critical);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(10 * 1024), "10 KB");
        assert_eq!(format_bytes(25 * 1024 * 1024), "25 MB");
        assert_eq!(format_bytes(2 * 1024 * 1024 * 1024), "2.00 GB");
    }
}
