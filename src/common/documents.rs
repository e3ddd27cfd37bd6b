//! Validação de CPF e CNPJ por dígitos verificadores (módulo 11 ponderado).

/// Mantém apenas os dígitos da entrada.
pub fn only_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn all_same_digit(digits: &str) -> bool {
    let mut chars = digits.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => true,
    }
}

// Soma ponderada módulo 11; resto < 2 vale dígito 0, senão 11 - resto.
fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 { 0 } else { 11 - remainder }
}

/// Valida um CPF (11 dígitos). Aceita entrada com máscara.
pub fn is_valid_cpf(raw: &str) -> bool {
    let cpf = only_digits(raw);
    if cpf.len() != 11 || all_same_digit(&cpf) {
        return false;
    }

    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();

    let weights1: Vec<u32> = (2..=10).rev().collect();
    let d1 = check_digit(&digits[..9], &weights1);

    let weights2: Vec<u32> = (2..=11).rev().collect();
    let d2 = check_digit(&digits[..10], &weights2);

    d1 == digits[9] && d2 == digits[10]
}

/// Valida um CNPJ (14 dígitos). Aceita entrada com máscara.
pub fn is_valid_cnpj(raw: &str) -> bool {
    let cnpj = only_digits(raw);
    if cnpj.len() != 14 || all_same_digit(&cnpj) {
        return false;
    }

    let digits: Vec<u32> = cnpj.chars().filter_map(|c| c.to_digit(10)).collect();

    const WEIGHTS1: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    const WEIGHTS2: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    let d1 = check_digit(&digits[..12], &WEIGHTS1);
    let d2 = check_digit(&digits[..13], &WEIGHTS2);

    d1 == digits[12] && d2 == digits[13]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_cpf() {
        assert!(is_valid_cpf("52998224725"));
        assert!(is_valid_cpf("529.982.247-25"));
    }

    #[test]
    fn rejects_cpf_with_bad_check_digits() {
        assert!(!is_valid_cpf("52998224726"));
        assert!(!is_valid_cpf("52998224715"));
    }

    #[test]
    fn rejects_cpf_with_wrong_length() {
        assert!(!is_valid_cpf(""));
        assert!(!is_valid_cpf("5299822472"));
        assert!(!is_valid_cpf("529982247250"));
    }

    #[test]
    fn rejects_repeated_sequence_cpf() {
        assert!(!is_valid_cpf("00000000000"));
        assert!(!is_valid_cpf("11111111111"));
        assert!(!is_valid_cpf("99999999999"));
    }

    #[test]
    fn accepts_valid_cnpj() {
        assert!(is_valid_cnpj("11222333000181"));
        assert!(is_valid_cnpj("11.222.333/0001-81"));
    }

    #[test]
    fn rejects_cnpj_with_bad_check_digits() {
        assert!(!is_valid_cnpj("11222333000182"));
        assert!(!is_valid_cnpj("11222333000191"));
    }

    #[test]
    fn rejects_cnpj_with_wrong_length() {
        assert!(!is_valid_cnpj(""));
        assert!(!is_valid_cnpj("1122233300018"));
        assert!(!is_valid_cnpj("112223330001810"));
    }

    #[test]
    fn rejects_repeated_sequence_cnpj() {
        assert!(!is_valid_cnpj("00000000000000"));
        assert!(!is_valid_cnpj("77777777777777"));
    }

    #[test]
    fn only_digits_strips_mask() {
        assert_eq!(only_digits("529.982.247-25"), "52998224725");
        assert_eq!(only_digits("abc"), "");
    }
}
