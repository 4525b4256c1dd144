use super::types::Task;

pub fn find_task(tasks: &[Task], id: u32) -> Option<&Task> {
    tasks.iter().find(|task| task.id == id)
}

pub fn find_task_mut(tasks: &mut [Task], id: u32) -> Option<&mut Task> {
    tasks.iter_mut().find(|task| task.id == id)
}

pub fn position_of(tasks: &[Task], id: u32) -> Option<usize> {
    tasks.iter().position(|task| task.id == id)
}

/// Trimmed title, or `None` when nothing is left.
pub fn normalize_title(title: &str) -> Option<String> {
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Buy milk "), Some("Buy milk".to_string()));
        assert_eq!(normalize_title(""), None);
        assert_eq!(normalize_title(" \t\n "), None);
    }
}
