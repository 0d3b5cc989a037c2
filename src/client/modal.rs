/// The modal currently shown over a view, carrying its controlled form values.
///
/// `Edit` and `Delete` hold the identifier of the selected entity; closing the
/// modal clears the selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Modal<F> {
    #[default]
    Closed,
    Create(F),
    Edit {
        id: String,
        form: F,
    },
    Delete {
        id: String,
        display_name: String,
    },
}

impl<F> Modal<F> {
    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::Closed)
    }

    pub fn selected_id(&self) -> Option<&str> {
        match self {
            Modal::Edit { id, .. } | Modal::Delete { id, .. } => Some(id),
            Modal::Closed | Modal::Create(_) => None,
        }
    }

    pub fn form(&self) -> Option<&F> {
        match self {
            Modal::Create(form) | Modal::Edit { form, .. } => Some(form),
            Modal::Closed | Modal::Delete { .. } => None,
        }
    }

    /// Mutable access to the form for controlled-input updates.
    pub fn form_mut(&mut self) -> Option<&mut F> {
        match self {
            Modal::Create(form) | Modal::Edit { form, .. } => Some(form),
            Modal::Closed | Modal::Delete { .. } => None,
        }
    }

    pub fn close(&mut self) {
        *self = Modal::Closed;
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Modal::Closed => "none",
            Modal::Create(_) => "create",
            Modal::Edit { .. } => "update",
            Modal::Delete { .. } => "delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_modal_has_selection_but_no_form() {
        let mut modal: Modal<String> = Modal::Delete {
            id: "p1".to_string(),
            display_name: "Aloe Gel".to_string(),
        };

        assert_eq!(modal.selected_id(), Some("p1"));
        assert!(modal.form_mut().is_none());

        modal.close();
        assert!(!modal.is_open());
        assert_eq!(modal.selected_id(), None);
    }

    #[test]
    fn edit_form_is_mutable_in_place() {
        let mut modal = Modal::Edit {
            id: "u1".to_string(),
            form: "Kelly".to_string(),
        };

        if let Some(form) = modal.form_mut() {
            form.push_str(" Phan");
        }

        assert_eq!(modal.form().map(String::as_str), Some("Kelly Phan"));
    }
}
