use crate::error::{AppError, AppResult};

pub fn validate_nombre(nombre: &str) -> AppResult<()> {
    let nombre = nombre.trim();
    if nombre.is_empty() {
        return Err(AppError::Validation("El nombre es obligatorio".into()));
    }
    if nombre.chars().count() < 2 {
        return Err(AppError::Validation(
            "El nombre debe tener al menos 2 caracteres".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::Validation(
            "El correo electrónico es obligatorio".into(),
        ));
    }
    if !email_format_ok(email) {
        return Err(AppError::Validation(
            "Ingresa un correo electrónico válido".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.is_empty() {
        return Err(AppError::Validation("La contraseña es obligatoria".into()));
    }
    if password.chars().count() < 6 {
        return Err(AppError::Validation(
            "La contraseña debe tener al menos 6 caracteres".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "La contraseña debe contener al menos un número".into(),
        ));
    }
    Ok(())
}

pub fn validate_password_confirmation(password: &str, confirmation: &str) -> AppResult<()> {
    if confirmation.is_empty() {
        return Err(AppError::Validation("Confirma tu contraseña".into()));
    }
    if password != confirmation {
        return Err(AppError::Validation("Las contraseñas no coinciden".into()));
    }
    Ok(())
}

fn email_format_ok(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;

    #[test]
    fn accepts_a_normal_email() {
        assert!(validate_email("maria@textil.com").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["", "sin-arroba", "@dominio.com", "a@b", "a b@c.com", "a@.com"] {
            let err = validate_email(email).unwrap_err();
            assert_eq!(err.error_type(), ErrorType::ValidationError, "{email}");
        }
    }

    #[test]
    fn password_needs_length_and_a_digit() {
        assert!(validate_password("ab1").is_err());
        assert!(validate_password("abcdef").is_err());
        assert!(validate_password("abcde1").is_ok());
    }

    #[test]
    fn confirmation_must_match() {
        assert!(validate_password_confirmation("textil1", "textil1").is_ok());
        assert!(validate_password_confirmation("textil1", "textil2").is_err());
        assert!(validate_password_confirmation("textil1", "").is_err());
    }

    #[test]
    fn nombre_needs_two_chars() {
        assert!(validate_nombre("M").is_err());
        assert!(validate_nombre("  ").is_err());
        assert!(validate_nombre("Ma").is_ok());
    }
}
