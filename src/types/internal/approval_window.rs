use crate::errors::WorkflowError;

pub const APPROVAL_START_HOUR_KEY: &str = "approvalStartHour";
pub const APPROVAL_END_HOUR_KEY: &str = "approvalEndHour";

/// Hours of the day during which non-admins may approve borrow requests.
///
/// Both bounds are inclusive: with `8..=18` an approval at 18:59 is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl ApprovalWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, WorkflowError> {
        if start_hour > 23 {
            return Err(WorkflowError::invalid("approval_start_hour", "must be between 0 and 23"));
        }
        if end_hour > 23 {
            return Err(WorkflowError::invalid("approval_end_hour", "must be between 0 and 23"));
        }
        Ok(Self { start_hour, end_hour })
    }

    pub fn contains(&self, hour: u32) -> bool {
        !(hour < self.start_hour || hour > self.end_hour)
    }
}

impl Default for ApprovalWindow {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 18,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_bound_is_inclusive() {
        let window = ApprovalWindow::default();
        assert!(window.contains(8));
        assert!(window.contains(18));
        assert!(!window.contains(19));
        assert!(!window.contains(7));
    }

    #[test]
    fn test_rejects_out_of_range_hours() {
        assert!(ApprovalWindow::new(0, 23).is_ok());
        assert!(ApprovalWindow::new(24, 10).is_err());
        assert!(ApprovalWindow::new(8, 30).is_err());
    }
}
