use crate::error::{AppError, AppResult};
use std::collections::HashSet;

/// 把 "홍길동,김철수" "이영희" 这类输入拆成姓名列表：逗号与空白都作分隔，
/// 丢弃空项，按首次出现顺序去重
pub fn parse_name_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens
        .iter()
        .flat_map(|t| {
            t.as_ref()
                .split(|c: char| c == ',' || c.is_whitespace())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// 解析正整数个数：必须全为 ASCII 数字且 >= 1
pub fn parse_count(token: &str) -> AppResult<usize> {
    let token = token.trim();
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::InvalidArgument("숫자를 입력하세요.".to_string()));
    }
    let n: usize = token
        .parse()
        .map_err(|_| AppError::InvalidArgument("숫자가 너무 큽니다.".to_string()))?;
    if n == 0 {
        return Err(AppError::InvalidArgument(
            "1 이상의 숫자를 입력하세요.".to_string(),
        ));
    }
    Ok(n)
}

/// `이름1 이름2,이름3 ... k` 形式：最后一个参数是人数
pub fn parse_names_and_count<S: AsRef<str>>(args: &[S]) -> AppResult<(Vec<String>, usize)> {
    let Some((last, names)) = args.split_last().filter(|_| args.len() >= 2) else {
        return Err(AppError::InvalidArgument(
            "최소 1명 이상의 이름과 추첨 인원 수를 입력하세요.".to_string(),
        ));
    };
    let k = parse_count(last.as_ref()).map_err(|e| match e {
        AppError::InvalidArgument(msg) => {
            AppError::InvalidArgument(format!("추첨 인원 수: {msg}"))
        }
        other => other,
    })?;
    let names = parse_name_tokens(names);
    if names.is_empty() {
        return Err(AppError::InvalidArgument("유효한 이름이 없습니다.".to_string()));
    }
    Ok((names, k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_tokens_mixed_separators() {
        assert_eq!(
            parse_name_tokens(&["홍길동,김철수", "이영희", " ,, ", "김철수", "박 민수"]),
            vec!["홍길동", "김철수", "이영희", "박", "민수"]
        );
        assert!(parse_name_tokens::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("3").unwrap(), 3);
        assert_eq!(parse_count(" 12 ").unwrap(), 12);
        assert!(parse_count("0").is_err());
        assert!(parse_count("-1").is_err());
        assert!(parse_count("3명").is_err());
        assert!(parse_count("").is_err());
        assert!(parse_count("99999999999999999999999999").is_err());
    }

    #[test]
    fn test_parse_names_and_count() {
        let (names, k) = parse_names_and_count(&["a,b", "c", "a", "2"]).unwrap();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(k, 2);

        assert!(parse_names_and_count(&["5"]).is_err());
        assert!(parse_names_and_count(&["a", "x"]).is_err());
        assert!(parse_names_and_count(&[",", "2"]).is_err());
        assert!(parse_names_and_count::<&str>(&[]).is_err());
    }
}
