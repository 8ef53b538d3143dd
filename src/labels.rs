// Portuguese display labels for the raw codes found in technical records

const MISSING: &str = "-";

pub fn fuel_label(fuel: Option<&str>) -> String {
    let Some(raw) = fuel.filter(|f| !f.is_empty()) else {
        return MISSING.to_string();
    };
    let f = raw.to_lowercase();

    let label = match f.as_str() {
        "gas" | "gasoline" | "petrol" => "Gasolina",
        "diesel" => "Diesel",
        "electricity" | "ev" | "electric" => "Elétrico",
        _ if f.contains("flex") => "Flex",
        _ if f.contains("hybrid") => "Híbrido",
        _ => raw,
    };
    label.to_string()
}

pub fn transmission_label(transmission: Option<&str>) -> String {
    let Some(raw) = transmission.filter(|t| !t.is_empty()) else {
        return MISSING.to_string();
    };
    let t = raw.to_lowercase();

    if t == "a" || t.contains("auto") {
        "Automática".to_string()
    } else if t == "m" || t.contains("manual") {
        "Manual".to_string()
    } else {
        raw.to_string()
    }
}

pub fn drive_label(drive: Option<&str>) -> String {
    let Some(raw) = drive.filter(|d| !d.is_empty()) else {
        return MISSING.to_string();
    };
    let d = raw.to_lowercase();

    let label = if d == "awd" || d.contains("all") {
        "Integral (AWD)"
    } else if d == "4wd" {
        "4x4 (4WD)"
    } else if d == "fwd" || d.contains("front") {
        "Dianteira (FWD)"
    } else if d == "rwd" || d.contains("rear") {
        "Traseira (RWD)"
    } else {
        raw
    };
    label.to_string()
}

pub fn vehicle_type_label(vehicle_type: Option<i64>) -> String {
    match vehicle_type {
        Some(1) => "Automóvel".to_string(),
        Some(other) => other.to_string(),
        None => MISSING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuels() {
        assert_eq!(fuel_label(Some("Gasoline")), "Gasolina");
        assert_eq!(fuel_label(Some("EV")), "Elétrico");
        assert_eq!(fuel_label(Some("Flex-fuel")), "Flex");
        assert_eq!(fuel_label(Some("plug-in hybrid")), "Híbrido");
        assert_eq!(fuel_label(Some("hydrogen")), "hydrogen");
        assert_eq!(fuel_label(None), "-");
    }

    #[test]
    fn transmissions() {
        assert_eq!(transmission_label(Some("A")), "Automática");
        assert_eq!(transmission_label(Some("automated manual")), "Automática");
        assert_eq!(transmission_label(Some("m")), "Manual");
        assert_eq!(transmission_label(Some("CVT")), "CVT");
        assert_eq!(transmission_label(Some("")), "-");
    }

    #[test]
    fn drivetrains() {
        assert_eq!(drive_label(Some("AWD")), "Integral (AWD)");
        assert_eq!(drive_label(Some("4wd")), "4x4 (4WD)");
        assert_eq!(drive_label(Some("front-wheel drive")), "Dianteira (FWD)");
        assert_eq!(drive_label(Some("rwd")), "Traseira (RWD)");
        assert_eq!(drive_label(None), "-");
    }

    #[test]
    fn vehicle_types() {
        assert_eq!(vehicle_type_label(Some(1)), "Automóvel");
        assert_eq!(vehicle_type_label(Some(2)), "2");
        assert_eq!(vehicle_type_label(None), "-");
    }
}
